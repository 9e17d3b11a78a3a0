use vocab::Base as _;

use crate::engine::Engine;
use crate::errors::{ProcessError, Result};

/// how many fetch hops a single collection walk may take. remote servers
/// control the page chain, so an unbounded walk is an invitation.
pub const MAX_COLLECTION_DEPTH: usize = 4;

/// flatten a collection document into its raw items, following `first` and
/// `next` over the wire where needed. items come back untyped: collections
/// in the wild hold anything from bare iris to full documents.
pub async fn parse_collection(engine: &Engine, root: serde_json::Value) -> Result<Vec<serde_json::Value>> {
	parse_level(engine, root, 0).await
}

pub async fn parse_collection_url(engine: &Engine, url: &str) -> Result<Vec<serde_json::Value>> {
	let root = engine.fetch_document(url).await?;
	parse_level(engine, root, 0).await
}

fn raw_items(payload: &serde_json::Value) -> Vec<serde_json::Value> {
	let mut out = Vec::new();
	for field in ["items", "orderedItems"] {
		match payload.get(field) {
			Some(serde_json::Value::Array(arr)) => out.extend(arr.iter().cloned()),
			Some(x) if !x.is_null() => out.push(x.clone()),
			_ => {},
		}
	}
	out
}

#[async_recursion::async_recursion]
async fn parse_level(engine: &Engine, payload: serde_json::Value, level: usize) -> Result<Vec<serde_json::Value>> {
	if level > MAX_COLLECTION_DEPTH {
		return Err(ProcessError::RecursionLimitExceeded);
	}

	let kind = match payload.activity_type() {
		Some(kind) if kind.is_collection() => kind,
		Some(kind) => return Err(ProcessError::unexpected("a collection", kind.as_ref())),
		None => return Err(ProcessError::unexpected("a collection", "an untyped document")),
	};

	let mut out = raw_items(&payload);

	if kind.is_collection_page() {
		// pages chain forward
		if let Some(next) = payload.get("next").and_then(|x| x.as_str()) {
			let next = next.to_string();
			out.extend(fetch_level(engine, &next, level + 1).await?);
		}
	} else if out.is_empty() {
		// the root holds nothing itself, walk its first page
		match payload.get("first") {
			Some(serde_json::Value::String(first)) => {
				let first = first.to_string();
				out.extend(fetch_level(engine, &first, level + 1).await?);
			},
			Some(first) if first.is_object() =>
				out.extend(parse_level(engine, first.clone(), level + 1).await?),
			_ => {},
		}
	}

	Ok(out)
}

async fn fetch_level(engine: &Engine, url: &str, level: usize) -> Result<Vec<serde_json::Value>> {
	if level > MAX_COLLECTION_DEPTH {
		return Err(ProcessError::RecursionLimitExceeded);
	}
	let payload = engine.fetch_document(url).await?;
	parse_level(engine, payload, level).await
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;
	use std::sync::Arc;

	use crate::{Backend, Engine, ProcessError, UrlGuard};

	struct CannedFetcher {
		documents: HashMap<String, serde_json::Value>,
	}

	#[async_trait::async_trait]
	impl Backend for CannedFetcher {
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

	fn engine(documents: HashMap<String, serde_json::Value>) -> Engine {
		let guard = UrlGuard::with_resolver(|_| vec!["93.184.216.34".parse().unwrap()]);
		Engine::with_guard(Arc::new(CannedFetcher { documents }), guard)
	}

	#[tokio::test]
	async fn paged_ordered_collection_flattens_in_order() {
		let engine = engine(HashMap::from([
			("https://example.com/list".to_string(), serde_json::json!({
				"type": "OrderedCollection",
				"id": "https://example.com/list",
				"first": "https://example.com/list?page=0",
			})),
			("https://example.com/list?page=0".to_string(), serde_json::json!({
				"type": "OrderedCollectionPage",
				"id": "https://example.com/list?page=0",
				"orderedItems": [1, 2, 3],
				"next": "https://example.com/list?page=1",
			})),
			("https://example.com/list?page=1".to_string(), serde_json::json!({
				"type": "OrderedCollectionPage",
				"id": "https://example.com/list?page=1",
				"orderedItems": [4, 5, 6],
			})),
		]));
		let items = super::parse_collection_url(&engine, "https://example.com/list").await.unwrap();
		assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
	}

	#[tokio::test]
	async fn inline_first_page_needs_no_fetch() {
		let engine = engine(HashMap::new());
		let items = super::parse_collection(&engine, serde_json::json!({
			"type": "Collection",
			"first": {
				"type": "CollectionPage",
				"items": ["https://example.com/a", "https://example.com/b"],
			},
		})).await.unwrap();
		assert_eq!(items.len(), 2);
	}

	#[tokio::test]
	async fn items_on_the_root_win_over_pagination() {
		let engine = engine(HashMap::new());
		let items = super::parse_collection(&engine, serde_json::json!({
			"type": "OrderedCollection",
			"orderedItems": ["https://example.com/a"],
			"first": "https://example.com/never-fetched",
		})).await.unwrap();
		assert_eq!(items, vec!["https://example.com/a"]);
	}

	#[tokio::test]
	async fn self_referential_first_page_hits_the_recursion_limit() {
		let engine = engine(HashMap::from([
			("https://example.com/loop".to_string(), serde_json::json!({
				"type": "Collection",
				"id": "https://example.com/loop",
				"first": "https://example.com/loop",
			})),
		]));
		assert!(matches!(
			super::parse_collection_url(&engine, "https://example.com/loop").await,
			Err(ProcessError::RecursionLimitExceeded),
		));
	}

	#[tokio::test]
	async fn non_collection_roots_are_refused() {
		let engine = engine(HashMap::new());
		assert!(matches!(
			super::parse_collection(&engine, serde_json::json!({
				"type": "Note",
				"content": "not a collection",
			})).await,
			Err(ProcessError::UnexpectedType { .. }),
		));
		assert!(matches!(
			super::parse_collection(&engine, serde_json::json!({"items": [1]})).await,
			Err(ProcessError::UnexpectedType { .. }),
		));
	}
}
