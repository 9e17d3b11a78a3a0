use base64::Engine;
use openssl::rsa::Rsa;

use crate::errors::{ProcessError, Result};

/// rsa keypair bound to an actor. the public half travels inside the actor
/// document, the private half never leaves the backend.
#[derive(Debug, Clone)]
pub struct Key {
	pub owner: String,
	pub id: String,
	pub public_pem: String,
	pub private_pem: Option<String>,
}

impl Key {
	pub fn new(owner: impl ToString) -> Self {
		let owner = owner.to_string();
		let id = format!("{owner}#main-key");
		Key { owner, id, public_pem: String::new(), private_pem: None }
	}

	pub fn with_id(mut self, id: impl ToString) -> Self {
		self.id = id.to_string();
		self
	}

	/// mint a fresh 2048 bit keypair
	pub fn generate(owner: impl ToString) -> Result<Self> {
		let mut key = Key::new(owner);
		let rsa = Rsa::generate(2048)?;
		key.private_pem = Some(std::str::from_utf8(&rsa.private_key_to_pem()?)?.to_string());
		key.public_pem = std::str::from_utf8(&rsa.public_key_to_pem()?)?.to_string();
		Ok(key)
	}

	pub fn load_private(owner: impl ToString, pem: &str) -> Result<Self> {
		let mut key = Key::new(owner);
		let rsa = Rsa::private_key_from_pem(pem.as_bytes())?;
		key.private_pem = Some(pem.to_string());
		key.public_pem = std::str::from_utf8(&rsa.public_key_to_pem()?)?.to_string();
		Ok(key)
	}

	pub fn load_public(owner: impl ToString, pem: &str) -> Result<Self> {
		let mut key = Key::new(owner);
		Rsa::public_key_from_pem(pem.as_bytes())?;
		key.public_pem = pem.to_string();
		Ok(key)
	}

	pub fn key_id(&self) -> &str {
		&self.id
	}

	pub fn private_pem(&self) -> Result<&str> {
		self.private_pem.as_deref().ok_or(ProcessError::MissingKeyMaterial)
	}

	/// the `publicKey` fragment embedded in actor documents
	pub fn to_value(&self) -> serde_json::Value {
		serde_json::json!({
			"id": self.id,
			"owner": self.owner,
			"publicKeyPem": self.public_pem,
		})
	}

	pub fn from_value(doc: &serde_json::Value) -> Result<Self> {
		use vocab::PublicKey as _;
		let owner = doc.owner()
			.ok_or_else(|| ProcessError::bad_activity("public key without owner"))?
			.to_string();
		let pem = doc.public_key_pem()
			.ok_or_else(|| ProcessError::bad_activity("public key without pem material"))?;
		let mut key = Key::load_public(owner, pem)?;
		if let Some(id) = doc.get("id").and_then(|x| x.as_str()) {
			key.id = id.to_string();
		}
		Ok(key)
	}

	/// salmon magic envelope representation, still used for webfinger links
	pub fn to_magic_key(&self) -> Result<String> {
		let rsa = Rsa::public_key_from_pem(self.public_pem.as_bytes())?;
		let modulus = base64::prelude::BASE64_URL_SAFE.encode(rsa.n().to_vec());
		let exponent = base64::prelude::BASE64_URL_SAFE.encode(rsa.e().to_vec());
		Ok(format!("data:application/magic-public-key,RSA.{modulus}.{exponent}"))
	}
}

#[cfg(test)]
mod test {
	#[test]
	fn generated_key_round_trips_through_pem() {
		let key = super::Key::generate("https://example.com/actor").unwrap();
		assert_eq!(key.id, "https://example.com/actor#main-key");
		assert!(key.private_pem.is_some());

		let reloaded = super::Key::load_private(&key.owner, key.private_pem().unwrap()).unwrap();
		assert_eq!(reloaded.public_pem, key.public_pem);
	}

	#[test]
	fn public_key_document_shape() {
		let key = super::Key::generate("https://example.com/actor").unwrap();
		let doc = key.to_value();
		assert_eq!(doc["id"], "https://example.com/actor#main-key");
		assert_eq!(doc["owner"], "https://example.com/actor");
		assert!(doc["publicKeyPem"].as_str().unwrap().contains("BEGIN PUBLIC KEY"));

		let parsed = super::Key::from_value(&doc).unwrap();
		assert_eq!(parsed.owner, key.owner);
		assert_eq!(parsed.id, key.id);
		assert!(parsed.private_pem.is_none());
	}

	#[test]
	fn public_only_key_refuses_to_hand_out_private_material() {
		let key = super::Key::generate("https://example.com/actor").unwrap();
		let public_only = super::Key::load_public(&key.owner, &key.public_pem).unwrap();
		assert!(matches!(
			public_only.private_pem(),
			Err(crate::ProcessError::MissingKeyMaterial),
		));
	}

	#[test]
	fn magic_key_shape() {
		let key = super::Key::generate("https://example.com/actor").unwrap();
		let magic = key.to_magic_key().unwrap();
		assert!(magic.starts_with("data:application/magic-public-key,RSA."));
		assert_eq!(magic.split('.').count(), 3);
	}
}
