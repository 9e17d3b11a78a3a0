use std::sync::{Arc, Mutex};

use vocab::{ActivityType, VerbType, Object as _};

use crate::activity::Activity;
use crate::errors::{ProcessError, Result};

/// embedding strips fields that only make sense on a top level document
fn embed(data: &serde_json::Value) -> serde_json::Value {
	let mut out = data.clone();
	if let Some(map) = out.as_object_mut() {
		map.remove("@context");
		map.remove("signature");
	}
	out
}

/// the Accept a local actor answers an incoming Follow with
pub fn build_accept(follow: &Activity) -> Result<Activity> {
	let follower = follow.actor_iri()
		.ok_or_else(|| ProcessError::bad_activity("follow without actor"))?;
	let followed = follow.object_node().id()
		.ok_or_else(|| ProcessError::bad_activity("follow without object"))?
		.to_string();
	Activity::parse(serde_json::json!({
		"type": "Accept",
		"actor": followed,
		"object": embed(follow.data()),
		"to": [follower],
	}))
}

/// wrap a previously sent Follow, Like or Announce for retraction. the
/// wrapped Like/Announce is embedded with its object shrunk to a bare id.
pub fn build_undo(activity: &Activity) -> Result<Activity> {
	let actor = activity.actor_iri()
		.ok_or_else(|| ProcessError::bad_activity("cannot undo an activity without actor"))?;
	let mut wrapped = embed(activity.data());
	match activity.kind() {
		ActivityType::Verb(VerbType::Follow) => {},
		ActivityType::Verb(VerbType::Like | VerbType::Announce) => {
			if let Some(id) = activity.object_node().id() {
				let id = id.to_string();
				if let Some(map) = wrapped.as_object_mut() {
					map.insert("object".to_string(), serde_json::json!(id));
				}
			}
		},
		kind => return Err(ProcessError::unexpected("an undoable activity", kind.as_ref())),
	}
	Activity::parse(serde_json::json!({
		"type": "Undo",
		"actor": actor,
		"object": wrapped,
	}))
}

/// wrap a bare content object into the Create that will carry it. the source
/// arc is tracked so the id minted at posting time flows back to the caller.
pub fn build_create(source: &Arc<Mutex<serde_json::Value>>) -> Result<Activity> {
	let note = source.lock()
		.map_err(|_| ProcessError::bad_activity("source object lock poisoned"))?
		.clone();
	let actor = note.attributed_to().id()
		.ok_or_else(|| ProcessError::bad_activity("content object without attributedTo"))?
		.to_string();
	let mut create = serde_json::json!({
		"type": "Create",
		"actor": actor,
		"object": embed(&note),
	});
	// addressing and timestamps mirror the wrapped object
	if let Some(map) = create.as_object_mut() {
		for field in ["published", "to", "bto", "cc", "bcc", "audience"] {
			if let Some(val) = note.get(field) {
				map.insert(field.to_string(), val.clone());
			}
		}
	}
	let mut activity = Activity::parse(create)?;
	activity.track_source(source);
	Ok(activity)
}

pub fn build_like(actor_iri: &str, object: &Activity) -> Result<Activity> {
	let target = object.id()
		.ok_or_else(|| ProcessError::bad_activity("cannot like an object without id"))?;
	let mut like = serde_json::json!({
		"type": "Like",
		"actor": actor_iri,
		"object": target,
	});
	if let Some(author) = object.data().attributed_to().id() {
		if let Some(map) = like.as_object_mut() {
			map.insert("to".to_string(), serde_json::json!([author]));
		}
	}
	Activity::parse(like)
}

pub fn build_announce(actor_iri: &str, object: &Activity, followers_iri: &str) -> Result<Activity> {
	let target = object.id()
		.ok_or_else(|| ProcessError::bad_activity("cannot announce an object without id"))?;
	let mut cc = vec![followers_iri.to_string()];
	if let Some(author) = object.data().attributed_to().id() {
		cc.push(author.to_string());
	}
	Activity::parse(serde_json::json!({
		"type": "Announce",
		"actor": actor_iri,
		"object": target,
		"to": [vocab::target::PUBLIC],
		"cc": cc,
		"published": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
	}))
}

pub fn tombstone(iri: &str) -> serde_json::Value {
	serde_json::json!({
		"type": "Tombstone",
		"id": iri,
	})
}

pub fn build_delete(object: &Activity) -> Result<Activity> {
	let actor = object.data().attributed_to().id()
		.ok_or_else(|| ProcessError::bad_activity("cannot delete an object without attributedTo"))?
		.to_string();
	let target = object.id()
		.ok_or_else(|| ProcessError::bad_activity("cannot delete an object without id"))?;
	Activity::parse(serde_json::json!({
		"type": "Delete",
		"actor": actor,
		"object": tombstone(target),
	}))
}
