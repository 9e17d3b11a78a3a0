use std::collections::VecDeque;

/// value of a json-ld field: nothing, a bare reference, an embedded document
/// or a list of the above
#[derive(Debug, Clone)]
pub enum Node {
	Empty,
	Link(String),
	Object(Box<serde_json::Value>),
	Array(VecDeque<Node>),
}

impl Node {
	pub fn link(uri: impl ToString) -> Self {
		Node::Link(uri.to_string())
	}

	pub fn maybe_link(uri: Option<impl ToString>) -> Self {
		match uri {
			Some(uri) => Node::Link(uri.to_string()),
			None => Node::Empty,
		}
	}

	pub fn links(uris: Vec<String>) -> Self {
		Node::Array(uris.into_iter().map(Node::Link).collect())
	}

	pub fn object(x: serde_json::Value) -> Self {
		Node::Object(Box::new(x))
	}

	pub fn maybe_object(x: Option<serde_json::Value>) -> Self {
		match x {
			Some(x) => Node::Object(Box::new(x)),
			None => Node::Empty,
		}
	}

	/// reference to the embedded document, or first one if many are present
	pub fn get(&self) -> Option<&serde_json::Value> {
		match self {
			Node::Empty | Node::Link(_) => None,
			Node::Object(x) => Some(x),
			Node::Array(v) => v.iter().find_map(|x| x.get()),
		}
	}

	/// consume the node, returning the embedded document if any
	pub fn extract(self) -> Option<serde_json::Value> {
		match self {
			Node::Empty | Node::Link(_) => None,
			Node::Object(x) => Some(*x),
			Node::Array(mut v) => v.pop_front()?.extract(),
		}
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Node::Empty)
	}

	pub fn is_link(&self) -> bool {
		matches!(self, Node::Link(_))
	}

	pub fn is_object(&self) -> bool {
		matches!(self, Node::Object(_))
	}

	pub fn len(&self) -> usize {
		match self {
			Node::Empty => 0,
			Node::Link(_) | Node::Object(_) => 1,
			Node::Array(v) => v.len(),
		}
	}

	/// id of the referenced entity: href for links, `id` field for documents,
	/// first resolvable for arrays
	pub fn id(&self) -> Option<&str> {
		match self {
			Node::Empty => None,
			Node::Link(uri) => Some(uri),
			Node::Object(obj) => obj.get("id")?.as_str(),
			Node::Array(arr) => arr.iter().find_map(|x| x.id()),
		}
	}

	pub fn all_ids(&self) -> Vec<String> {
		match self {
			Node::Empty => vec![],
			Node::Link(uri) => vec![uri.clone()],
			Node::Object(_) => self.id().map_or(vec![], |x| vec![x.to_string()]),
			Node::Array(arr) => arr.iter().flat_map(|x| x.all_ids()).collect(),
		}
	}

	pub fn flat(self) -> Vec<Node> {
		match self {
			Node::Empty => vec![],
			Node::Link(_) | Node::Object(_) => vec![self],
			// AS disallows arrays of arrays, no need to recurse
			Node::Array(arr) => arr.into(),
		}
	}
}

impl From<Option<&str>> for Node {
	fn from(value: Option<&str>) -> Self {
		Node::maybe_link(value)
	}
}

impl From<serde_json::Value> for Node {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::String(uri) => Node::Link(uri),
			serde_json::Value::Array(arr) => Node::Array(arr.into_iter().map(Node::from).collect()),
			serde_json::Value::Object(ref map) => {
				// a Link/Mention document is just a decorated reference
				let is_link = map.get("type")
					.and_then(|x| x.as_str())
					.map(|x| x == "Link" || x == "Mention")
					.unwrap_or(false);
				match map.get("href").and_then(|x| x.as_str()) {
					Some(href) if is_link => Node::Link(href.to_string()),
					_ => Node::Object(Box::new(value)),
				}
			},
			_ => Node::Empty,
		}
	}
}

impl From<Node> for serde_json::Value {
	fn from(value: Node) -> Self {
		match value {
			Node::Empty => serde_json::Value::Null,
			Node::Link(uri) => serde_json::Value::String(uri),
			Node::Object(obj) => *obj,
			Node::Array(arr) => serde_json::Value::Array(arr.into_iter().map(|x| x.into()).collect()),
		}
	}
}
