use std::sync::{Arc, Mutex, OnceLock, Weak};

use vocab::{ActivityType, Node, VerbType};
use vocab::{Base as _, Object as _, Activity as _};

use crate::backend::Backend;
use crate::errors::{ProcessError, Result};

pub const CTX_AS: &str = "https://www.w3.org/ns/activitystreams";
pub const CTX_SECURITY: &str = "https://w3id.org/security/v1";

fn extension_terms() -> serde_json::Value {
	serde_json::json!({
		"Hashtag": "as:Hashtag",
		"sensitive": "as:sensitive",
		"manuallyApprovesFollowers": "as:manuallyApprovesFollowers",
		"toot": "http://joinmastodon.org/ns#",
		"featured": "toot:featured",
		"schema": "http://schema.org#",
		"PropertyValue": "schema:PropertyValue",
		"value": "schema:value",
	})
}

/// normalize @context to a list carrying the security vocabulary and our
/// extension terms, whatever shape the sender picked
fn normalize_context(current: Option<serde_json::Value>) -> serde_json::Value {
	let mut ctx = match current {
		None => vec![serde_json::json!(CTX_AS)],
		Some(serde_json::Value::Array(arr)) => arr,
		Some(single) => vec![single],
	};
	if !ctx.iter().any(|x| x.as_str() == Some(CTX_SECURITY)) {
		ctx.push(serde_json::json!(CTX_SECURITY));
	}
	let terms = extension_terms();
	match ctx.last_mut().and_then(|x| x.as_object_mut()) {
		Some(tail) => {
			for (key, val) in terms.as_object().into_iter().flatten() {
				tail.entry(key.clone()).or_insert_with(|| val.clone());
			}
		},
		None => ctx.push(terms),
	}
	serde_json::Value::Array(ctx)
}

/// construction rules that vary by type
trait KindRules {
	fn actor_required(&self) -> bool;
	fn object_required(&self) -> bool;
}

impl KindRules for ActivityType {
	fn actor_required(&self) -> bool {
		self.is_verb()
	}

	fn object_required(&self) -> bool {
		self.is_verb()
	}
}

/// a validated activitystreams document. the raw json stays authoritative,
/// typed access goes through the vocab traits. construction is the only
/// validation point: once you hold one of these its shape invariants hold.
#[derive(Debug, Clone)]
pub struct Activity {
	kind: ActivityType,
	data: serde_json::Value,
	actor_cache: OnceLock<Box<Activity>>,
	object_cache: OnceLock<Box<Activity>>,
	// Create keeps a handle on the caller's object so the id minted at
	// delivery time can flow back without the caller re-fetching
	source: Option<Weak<Mutex<serde_json::Value>>>,
}

impl Activity {
	pub fn parse(mut data: serde_json::Value) -> Result<Self> {
		let map = data.as_object_mut().ok_or(ProcessError::NotAnActivity)?;

		// null fields carry no information and trip downstream getters
		map.retain(|_, v| !v.is_null());

		let kind = match map.get("type").and_then(|x| x.as_str()) {
			None => return Err(ProcessError::bad_activity("missing type")),
			Some(t) => ActivityType::try_from(t)
				.map_err(|e| ProcessError::unexpected("a known activity type", e.0))?,
		};

		let ctx = normalize_context(map.remove("@context"));
		map.insert("@context".to_string(), ctx);

		if kind.actor_required() && !map.contains_key("actor") {
			// some implementations put the author in attributedTo even on verbs
			match map.get("attributedTo").cloned() {
				Some(attributed) => { map.insert("actor".to_string(), attributed); },
				None => return Err(ProcessError::bad_activity(format!("{} without actor", kind.as_ref()))),
			}
		}

		let mut activity = Activity {
			kind,
			data,
			actor_cache: OnceLock::new(),
			object_cache: OnceLock::new(),
			source: None,
		};

		if kind.actor_required() && activity.actor_iri().is_none() {
			return Err(ProcessError::bad_activity("actor carries no id"));
		}

		if kind.object_required() {
			activity.validate_object()?;
		}

		match kind {
			// new notes may arrive with just content, fill in the boilerplate
			ActivityType::Verb(VerbType::Create) => activity.init_create(),
			k if k.is_creatable() => {
				if activity.data.sensitive().is_none() {
					if let Some(map) = activity.data.as_object_mut() {
						map.insert("sensitive".to_string(), serde_json::json!(false));
					}
				}
			},
			_ => {},
		}

		Ok(activity)
	}

	/// parse and check the type against a family predicate
	pub fn parse_expected(
		data: serde_json::Value,
		pred: fn(&ActivityType) -> bool,
		expected: &'static str,
	) -> Result<Self> {
		let activity = Self::parse(data)?;
		if !pred(&activity.kind) {
			return Err(ProcessError::unexpected(expected, activity.kind.as_ref()));
		}
		Ok(activity)
	}

	fn validate_object(&self) -> Result<()> {
		let node = self.data.object();
		if node.is_empty() {
			return Err(ProcessError::bad_activity(format!("{} without object", self.kind.as_ref())));
		}
		if let Some(obj) = node.get() {
			let obj_type = obj.activity_type()
				.ok_or_else(|| ProcessError::bad_activity("embedded object without type"))?;
			match self.kind {
				// a created object has no id yet, the outbox mints one
				ActivityType::Verb(VerbType::Create) if !obj_type.is_creatable() =>
					return Err(ProcessError::unexpected("a creatable object", obj_type.as_ref())),
				ActivityType::Verb(VerbType::Create) => {},
				ActivityType::Verb(VerbType::Undo) if !obj_type.is_verb() =>
					return Err(ProcessError::unexpected("an activity", obj_type.as_ref())),
				_ if obj.id().is_none() =>
					return Err(ProcessError::bad_activity("embedded object without id")),
				_ => {},
			}
		}
		Ok(())
	}

	fn init_create(&mut self) {
		let actor = self.actor_iri();
		let published = self.data.published();
		if let Some(obj) = self.data.get_mut("object").and_then(|x| x.as_object_mut()) {
			if let Some(actor) = actor {
				obj.entry("attributedTo").or_insert_with(|| serde_json::json!(actor));
			}
			if let Some(published) = published {
				obj.entry("published").or_insert_with(||
					serde_json::json!(published.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
				);
			}
		}
	}

	pub fn id(&self) -> Option<&str> {
		self.data.id()
	}

	pub fn kind(&self) -> ActivityType {
		self.kind
	}

	pub fn data(&self) -> &serde_json::Value {
		&self.data
	}

	pub fn to_value(&self) -> serde_json::Value {
		self.data.clone()
	}

	pub fn actor_iri(&self) -> Option<String> {
		let node = self.data.actor();
		if !node.is_empty() {
			return node.id().map(str::to_string);
		}
		self.data.attributed_to().id().map(str::to_string)
	}

	pub fn object_node(&self) -> Node {
		self.data.object()
	}

	/// the inline object, revalidated as its own activity
	pub fn embedded(&self) -> Result<Activity> {
		match self.data.object().extract() {
			Some(obj) => Activity::parse(obj),
			None => Err(ProcessError::bad_activity("object is not embedded")),
		}
	}

	pub(crate) fn cached_actor(&self) -> Option<&Activity> {
		self.actor_cache.get().map(|x| x.as_ref())
	}

	pub(crate) fn cache_actor(&self, resolved: Activity) -> &Activity {
		self.actor_cache.get_or_init(|| Box::new(resolved))
	}

	pub(crate) fn cached_object(&self) -> Option<&Activity> {
		self.object_cache.get().map(|x| x.as_ref())
	}

	pub(crate) fn cache_object(&self, resolved: Activity) -> &Activity {
		self.object_cache.get_or_init(|| Box::new(resolved))
	}

	pub(crate) fn reset_object_cache(&mut self) {
		self.object_cache = OnceLock::new();
	}

	pub(crate) fn track_source(&mut self, source: &Arc<Mutex<serde_json::Value>>) {
		self.source = Some(Arc::downgrade(source));
	}

	/// assign the outbox-minted id. Create also stamps its embedded object and
	/// writes the id back through the tracked source, if the caller kept one.
	pub(crate) fn set_id(&mut self, iri: &str, obj_id: &str, backend: &dyn Backend) {
		if let Some(map) = self.data.as_object_mut() {
			map.insert("id".to_string(), serde_json::json!(iri));
		}
		if self.kind != ActivityType::Verb(VerbType::Create) {
			return;
		}
		let note_url = backend.note_url(obj_id);
		let object_id = format!("{iri}/activity");
		if let Some(obj) = self.data.get_mut("object").and_then(|x| x.as_object_mut()) {
			obj.insert("id".to_string(), serde_json::json!(object_id));
			obj.insert("url".to_string(), serde_json::json!(note_url));
		}
		if let Some(source) = self.source.as_ref().and_then(Weak::upgrade) {
			if let Ok(mut original) = source.lock() {
				if let Some(obj) = original.as_object_mut() {
					obj.insert("id".to_string(), serde_json::json!(object_id));
					obj.insert("url".to_string(), serde_json::json!(note_url));
				}
			}
		}
		self.reset_object_cache();
	}

	/// serialization for the wire: blind-copy fields stay local
	pub fn clean_for_delivery(&self) -> serde_json::Value {
		let mut out = self.data.clone();
		for field in ["bto", "bcc", "source"] {
			if let Some(map) = out.as_object_mut() {
				map.remove(field);
			}
			if self.kind == ActivityType::Verb(VerbType::Create) {
				if let Some(obj) = out.get_mut("object").and_then(|x| x.as_object_mut()) {
					obj.remove(field);
				}
			}
		}
		out
	}
}
