use std::collections::BTreeMap;

use httpsig::HttpSignature;

use crate::engine::Engine;
use crate::errors::{ProcessError, Result};
use crate::key::Key;

/// headers covered by outgoing signatures. header names are lowercase
/// throughout this module, normalize before calling in.
pub const SIGNED_HEADERS: [&str; 6] =
	["(request-target)", "user-agent", "host", "date", "digest", "content-type"];

fn http_date(when: chrono::DateTime<chrono::Utc>) -> String {
	when.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// produce the full header set for an outgoing signed request, `signature`
/// included. the caller attaches them verbatim.
pub fn sign_request(
	key: &Key,
	method: &str,
	url: &str,
	user_agent: &str,
	body: &[u8],
) -> Result<BTreeMap<String, String>> {
	let parsed = url::Url::parse(url)
		.map_err(|_| ProcessError::InvalidUrl(url.to_string()))?;
	let host = parsed.host_str()
		.ok_or_else(|| ProcessError::InvalidUrl(url.to_string()))?
		.to_string();
	let target = match parsed.query() {
		Some(query) => format!("{}?{query}", parsed.path()),
		None => parsed.path().to_string(),
	};

	let mut headers = BTreeMap::from([
		("host".to_string(), host),
		("date".to_string(), http_date(chrono::Utc::now())),
		("digest".to_string(), httpsig::digest(body)),
		("content-type".to_string(), "application/activity+json".to_string()),
		("user-agent".to_string(), user_agent.to_string()),
	]);

	let mut signature = HttpSignature::new(key.key_id(), "rsa-sha256", &SIGNED_HEADERS);
	signature
		.build(&method.to_lowercase(), &target, &headers)
		.sign(key.private_pem()?)?;
	headers.insert("signature".to_string(), signature.header());
	Ok(headers)
}

/// dereference a signature's keyId: either a bare Key document or an actor
/// carrying its key inline
pub async fn fetch_key(engine: &Engine, key_id: &str) -> Result<Key> {
	let doc = engine.fetch_document(key_id).await?;
	match doc.get("publicKey") {
		Some(embedded) => Key::from_value(embedded),
		None => Key::from_value(&doc),
	}
}

/// check an incoming request against the key its signature names. a missing
/// or failing signature is a plain `false`: what to do about unsigned
/// traffic is the embedder's policy, not ours.
pub async fn verify_request(
	engine: &Engine,
	method: &str,
	path: &str,
	headers: &BTreeMap<String, String>,
	body: &[u8],
) -> Result<bool> {
	let Some(header) = headers.get("signature") else {
		tracing::debug!("request carries no signature header");
		return Ok(false);
	};
	let Some(mut signature) = HttpSignature::parse(header) else {
		tracing::debug!("unparseable signature header: '{header}'");
		return Ok(false);
	};

	// recompute the digest ourselves so a swapped body cannot pass
	let mut checked = headers.clone();
	checked.insert("digest".to_string(), httpsig::digest(body));

	let key = fetch_key(engine, &signature.key_id).await?;
	if key.key_id() != signature.key_id {
		tracing::warn!(
			"key document {} does not answer for {}, refusing signature",
			key.key_id(), signature.key_id,
		);
		return Ok(false);
	}

	signature.build(&method.to_lowercase(), path, &checked);
	Ok(signature.verify(&key.public_pem)?)
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;
	use std::sync::Arc;

	use crate::{Backend, Engine, Key, ProcessError, UrlGuard};

	struct KeyServer {
		documents: HashMap<String, serde_json::Value>,
	}

	#[async_trait::async_trait]
	impl Backend for KeyServer {
		fn base_url(&self) -> String {
			"https://example.net".to_string()
		}

		async fn fetch_iri(&self, iri: &str) -> crate::Result<serde_json::Value> {
			self.documents.get(iri).cloned().ok_or(ProcessError::NotFound)
		}

		async fn post_to_remote_inbox(&self, _as_actor: &str, _payload: &serde_json::Value, _recipient: &str) -> crate::Result<()> {
			Ok(())
		}
	}

	fn engine_with_actor(key: &Key) -> Engine {
		let actor = serde_json::json!({
			"id": key.owner,
			"type": "Person",
			"publicKey": key.to_value(),
		});
		let documents = HashMap::from([(key.id.clone(), actor)]);
		let guard = UrlGuard::with_resolver(|_| vec!["93.184.216.34".parse().unwrap()]);
		Engine::with_guard(Arc::new(KeyServer { documents }), guard)
	}

	#[test]
	fn signed_headers_cover_the_body_digest() {
		let key = Key::generate("https://example.net/alice").unwrap();
		let headers = super::sign_request(
			&key, "POST", "https://example.com/bob/inbox?page=1", "casket-test", b"{}",
		).unwrap();
		assert_eq!(headers["digest"], httpsig::digest(b"{}"));
		assert_eq!(headers["host"], "example.com");
		assert!(headers["signature"].contains("keyId=\"https://example.net/alice#main-key\""));
		assert!(headers["signature"].contains("(request-target)"));
	}

	#[tokio::test]
	async fn round_trip_verifies_against_the_fetched_actor_key() {
		let key = Key::generate("https://example.net/alice").unwrap();
		let engine = engine_with_actor(&key);
		let body = br#"{"type": "Follow"}"#;
		let headers = super::sign_request(
			&key, "POST", "https://example.com/bob/inbox", "casket-test", body,
		).unwrap();
		assert!(super::verify_request(&engine, "POST", "/bob/inbox", &headers, body).await.unwrap());
	}

	#[tokio::test]
	async fn tampered_body_fails_verification() {
		let key = Key::generate("https://example.net/alice").unwrap();
		let engine = engine_with_actor(&key);
		let headers = super::sign_request(
			&key, "POST", "https://example.com/bob/inbox", "casket-test", b"original",
		).unwrap();
		assert!(!super::verify_request(&engine, "POST", "/bob/inbox", &headers, b"tampered").await.unwrap());
	}

	#[tokio::test]
	async fn unsigned_requests_are_a_negative_not_an_error() {
		let key = Key::generate("https://example.net/alice").unwrap();
		let engine = engine_with_actor(&key);
		let outcome = super::verify_request(
			&engine, "POST", "/bob/inbox", &std::collections::BTreeMap::new(), b"{}",
		).await.unwrap();
		assert!(!outcome);
	}

	#[tokio::test]
	async fn mismatched_key_document_is_refused() {
		let key = Key::generate("https://example.net/alice").unwrap();
		let mut engine_key = key.clone();
		engine_key.id = "https://example.net/mallory#main-key".to_string();
		// the fetched document answers under alice's iri but names another key
		let actor = serde_json::json!({
			"id": key.owner,
			"type": "Person",
			"publicKey": engine_key.to_value(),
		});
		let documents = std::collections::HashMap::from([(key.id.clone(), actor)]);
		let guard = UrlGuard::with_resolver(|_| vec!["93.184.216.34".parse().unwrap()]);
		let engine = Engine::with_guard(Arc::new(KeyServer { documents }), guard);

		let headers = super::sign_request(
			&key, "POST", "https://example.com/bob/inbox", "casket-test", b"{}",
		).unwrap();
		assert!(!super::verify_request(&engine, "POST", "/bob/inbox", &headers, b"{}").await.unwrap());
	}
}
