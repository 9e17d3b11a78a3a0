use std::collections::BTreeMap;

use base64::Engine;
use openssl::{hash::MessageDigest, pkey::PKey, sign::{Signer, Verifier}};
use sha2::Digest;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
	#[error("openssl error: {0}")]
	OpenSSL(#[from] openssl::error::ErrorStack),

	#[error("invalid base64 in signature: {0}")]
	Base64(#[from] base64::DecodeError),
}

/// body digest in the form expected by the `digest` header
pub fn digest(body: &[u8]) -> String {
	let hash = sha2::Sha256::digest(body);
	format!("SHA-256={}", base64::prelude::BASE64_STANDARD.encode(hash))
}

/// draft-cavage http signature over an ordered list of (pseudo)headers,
/// rsa-sha256 only since that's what the fediverse speaks
#[derive(Debug, Clone, Default)]
pub struct HttpSignature {
	pub key_id: String,
	pub algorithm: String,
	pub headers: Vec<String>,
	pub signature: String,
	control: String,
}

impl HttpSignature {
	pub fn new(key_id: impl ToString, algorithm: impl ToString, headers: &[&str]) -> Self {
		HttpSignature {
			key_id: key_id.to_string(),
			algorithm: algorithm.to_string(),
			headers: headers.iter().map(|x| x.to_string()).collect(),
			signature: String::new(),
			control: String::new(),
		}
	}

	/// parse a `Signature` header value; a missing or incomplete header is a
	/// normal negative, not an error
	pub fn parse(header: &str) -> Option<Self> {
		let mut sig = HttpSignature::default();
		header.split(',')
			.filter_map(|x| x.split_once('='))
			.map(|(k, v)| (k.trim(), v.trim_matches('"')))
			.for_each(|(k, v)| match k {
				"keyId" => sig.key_id = v.to_string(),
				"algorithm" => sig.algorithm = v.to_string(),
				"signature" => sig.signature = v.to_string(),
				"headers" => sig.headers = v.split(' ').map(|x| x.to_string()).collect(),
				_ => tracing::warn!("unexpected field in http signature: '{k}=\"{v}\"'"),
			});
		if sig.key_id.is_empty() || sig.signature.is_empty() || sig.headers.is_empty() {
			return None;
		}
		Some(sig)
	}

	pub fn header(&self) -> String {
		format!(
			"keyId=\"{}\",algorithm=\"{}\",headers=\"{}\",signature=\"{}\"",
			self.key_id, self.algorithm, self.headers.join(" "), self.signature,
		)
	}

	/// assemble the canonical signing string; header names must be lowercase,
	/// absent headers sign as empty strings
	pub fn build(&mut self, method: &str, target: &str, headers: &BTreeMap<String, String>) -> &mut Self {
		let mut out = Vec::new();
		for header in &self.headers {
			match header.as_str() {
				"(request-target)" => out.push(format!("(request-target): {method} {target}")),
				_ => out.push(
					format!("{header}: {}", headers.get(header).map(|x| x.as_str()).unwrap_or_default())
				),
			}
		}
		self.control = out.join("\n");
		self
	}

	pub fn sign(&mut self, private_key_pem: &str) -> Result<&str, SignatureError> {
		let key = PKey::private_key_from_pem(private_key_pem.as_bytes())?;
		let mut signer = Signer::new(MessageDigest::sha256(), &key)?;
		signer.update(self.control.as_bytes())?;
		self.signature = base64::prelude::BASE64_STANDARD.encode(signer.sign_to_vec()?);
		Ok(&self.signature)
	}

	pub fn verify(&self, public_key_pem: &str) -> Result<bool, SignatureError> {
		let key = PKey::public_key_from_pem(public_key_pem.as_bytes())?;
		let mut verifier = Verifier::new(MessageDigest::sha256(), &key)?;
		let signature = base64::prelude::BASE64_STANDARD.decode(&self.signature)?;
		Ok(verifier.verify_oneshot(&signature, self.control.as_bytes())?)
	}
}
