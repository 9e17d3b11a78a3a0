use vocab::{ActivityType, Node, VerbType};
use vocab::{Base as _, Object as _, Addressed as _};

use crate::activity::Activity;
use crate::builders;
use crate::engine::Engine;
use crate::errors::{ProcessError, Result};

/// outcome of the inbox pre-processing step: some activities are not errors,
/// just not for us
pub(crate) enum InboxDecision {
	Proceed,
	Drop(String),
}

/// per-verb processing, dispatched off the activity type. every hook has a
/// no-op default so each verb only spells out what makes it different.
#[async_trait::async_trait]
pub(crate) trait Verb: Send + Sync {
	/// raw delivery targets, before actors get resolved to inboxes
	async fn recipients(&self, _engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		Ok(activity.data().addressed())
	}

	async fn pre_process_inbox(&self, _engine: &Engine, _activity: &Activity) -> Result<InboxDecision> {
		Ok(InboxDecision::Proceed)
	}

	async fn process_inbox(&self, _engine: &Engine, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn pre_post_outbox(&self, _engine: &Engine, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn post_outbox(&self, _engine: &Engine, _activity: &Activity) -> Result<()> {
		Ok(())
	}
}

pub(crate) fn behavior(kind: ActivityType) -> &'static dyn Verb {
	match kind {
		ActivityType::Verb(VerbType::Follow) => &FollowVerb,
		ActivityType::Verb(VerbType::Accept) => &AcceptVerb,
		ActivityType::Verb(VerbType::Undo) => &UndoVerb,
		ActivityType::Verb(VerbType::Like) => &LikeVerb,
		ActivityType::Verb(VerbType::Announce) => &AnnounceVerb,
		ActivityType::Verb(VerbType::Create) => &CreateVerb,
		ActivityType::Verb(VerbType::Delete) => &DeleteVerb,
		ActivityType::Verb(VerbType::Update) => &UpdateVerb,
		_ => &DefaultVerb,
	}
}

/// deletes may wrap a Tombstone, which only names the casualty: the
/// pre-delete document is what carries addressing and attribution
async fn actual_object(engine: &Engine, activity: &Activity) -> Result<Activity> {
	let node = activity.object_node();
	if let Some(obj) = node.get() {
		if obj.activity_type() != Some(ActivityType::Tombstone) {
			return Activity::parse(obj.clone());
		}
	}
	let iri = node.id()
		.ok_or_else(|| ProcessError::bad_activity("object carries no id"))?;
	engine.fetch_activity(iri).await
}

struct DefaultVerb;
impl Verb for DefaultVerb {}

struct FollowVerb;

#[async_trait::async_trait]
impl Verb for FollowVerb {
	async fn recipients(&self, _engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		match activity.object_node().id() {
			Some(id) => Ok(vec![id.to_string()]),
			None => Err(ProcessError::bad_activity("follow without object")),
		}
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		// answering is on us, the backend only learns about the new follower
		let mut accept = builders::build_accept(activity)?;
		engine.post_to_outbox(&mut accept).await?;
		engine.backend().new_follower(activity).await
	}
}

struct AcceptVerb;

#[async_trait::async_trait]
impl Verb for AcceptVerb {
	async fn recipients(&self, engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		let follow = engine.resolve_object(activity).await?;
		match follow.actor_iri() {
			Some(actor) => Ok(vec![actor]),
			None => Err(ProcessError::bad_activity("accepted follow without actor")),
		}
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().new_following(activity).await
	}
}

struct UndoVerb;

#[async_trait::async_trait]
impl Verb for UndoVerb {
	async fn recipients(&self, engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		// the undone activity may be embedded or a bare reference, resolve
		// either way
		let wrapped = engine.resolve_object(activity).await?;
		match wrapped.kind() {
			// retracting a follow goes to the followed, not to our audience
			ActivityType::Verb(VerbType::Follow) => match wrapped.object_node().id() {
				Some(id) => Ok(vec![id.to_string()]),
				None => Err(ProcessError::bad_activity("undone follow without object")),
			},
			_ => {
				let target = engine.resolve_object(wrapped).await?;
				Ok(target.data().attributed_to().all_ids())
			},
		}
	}

	async fn pre_process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<InboxDecision> {
		let wrapped = engine.resolve_object(activity).await?;
		if wrapped.actor_iri() != activity.actor_iri() {
			return Err(ProcessError::bad_activity("cannot undo somebody else's activity"));
		}
		Ok(InboxDecision::Proceed)
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		let wrapped = engine.resolve_object(activity).await?;
		match wrapped.kind() {
			ActivityType::Verb(VerbType::Follow) =>
				engine.backend().undo_new_follower(wrapped).await,
			ActivityType::Verb(VerbType::Like) =>
				engine.backend().inbox_undo_like(wrapped).await,
			ActivityType::Verb(VerbType::Announce) =>
				engine.backend().inbox_undo_announce(wrapped).await,
			kind => {
				tracing::warn!("ignoring undo of unhandled activity type {}", kind.as_ref());
				Ok(())
			},
		}
	}

	async fn pre_post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		let wrapped = engine.resolve_object(activity).await?;
		let id = wrapped.id()
			.ok_or_else(|| ProcessError::bad_activity("cannot undo an activity without id"))?;
		let as_actor = activity.actor_iri()
			.ok_or_else(|| ProcessError::bad_activity("activity carries no actor"))?;
		if !engine.backend().is_from_outbox(&as_actor, id) {
			return Err(ProcessError::NotFromOutbox);
		}
		Ok(())
	}

	async fn post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		let wrapped = engine.resolve_object(activity).await?;
		match wrapped.kind() {
			ActivityType::Verb(VerbType::Follow) =>
				engine.backend().undo_new_following(wrapped).await,
			ActivityType::Verb(VerbType::Like) =>
				engine.backend().outbox_undo_like(wrapped).await,
			ActivityType::Verb(VerbType::Announce) =>
				engine.backend().outbox_undo_announce(wrapped).await,
			_ => Ok(()),
		}
	}
}

struct LikeVerb;

#[async_trait::async_trait]
impl Verb for LikeVerb {
	async fn recipients(&self, engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		let target = engine.resolve_object(activity).await?;
		Ok(target.data().attributed_to().all_ids())
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().inbox_like(activity).await
	}

	async fn post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().outbox_like(activity).await
	}
}

struct AnnounceVerb;

#[async_trait::async_trait]
impl Verb for AnnounceVerb {
	async fn recipients(&self, engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		let mut recipients = activity.data().addressed();
		let target = engine.resolve_object(activity).await?;
		recipients.extend(target.data().attributed_to().all_ids());
		Ok(recipients)
	}

	async fn pre_process_inbox(&self, _engine: &Engine, activity: &Activity) -> Result<InboxDecision> {
		// ostatus gives us opaque tag: references we cannot dereference
		if let Node::Link(uri) = activity.object_node() {
			if !uri.starts_with("http") {
				return Ok(InboxDecision::Drop(format!("undereferencable object '{uri}'")));
			}
		}
		Ok(InboxDecision::Proceed)
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		// fetch the boosted object so the backend sees it resolved
		engine.resolve_object(activity).await?;
		engine.backend().inbox_announce(activity).await
	}

	async fn post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().outbox_announce(activity).await
	}
}

struct CreateVerb;

#[async_trait::async_trait]
impl Verb for CreateVerb {
	async fn recipients(&self, _engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		let mut recipients = activity.data().addressed();
		if let Some(obj) = activity.object_node().get() {
			recipients.extend(obj.addressed());
		}
		Ok(recipients)
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().inbox_create(activity).await
	}

	async fn post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().outbox_create(activity).await
	}
}

struct DeleteVerb;

#[async_trait::async_trait]
impl Verb for DeleteVerb {
	async fn recipients(&self, engine: &Engine, activity: &Activity) -> Result<Vec<String>> {
		let object = actual_object(engine, activity).await?;
		Ok(object.data().addressed())
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().inbox_delete(activity).await
	}

	async fn pre_post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		let object = actual_object(engine, activity).await?;
		let id = object.id()
			.ok_or_else(|| ProcessError::bad_activity("cannot delete an object without id"))?;
		let as_actor = activity.actor_iri()
			.ok_or_else(|| ProcessError::bad_activity("activity carries no actor"))?;
		if !engine.backend().is_from_outbox(&as_actor, id) {
			return Err(ProcessError::NotFromOutbox);
		}
		Ok(())
	}

	async fn post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().outbox_delete(activity).await
	}
}

struct UpdateVerb;

#[async_trait::async_trait]
impl Verb for UpdateVerb {
	async fn pre_process_inbox(&self, _engine: &Engine, activity: &Activity) -> Result<InboxDecision> {
		if let Some(obj) = activity.object_node().get() {
			if let Some(author) = obj.attributed_to().id() {
				if activity.actor_iri().as_deref() != Some(author) {
					return Err(ProcessError::bad_activity("cannot update somebody else's object"));
				}
			}
		}
		Ok(InboxDecision::Proceed)
	}

	async fn process_inbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().inbox_update(activity).await
	}

	async fn pre_post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		let node = activity.object_node();
		let id = node.id()
			.ok_or_else(|| ProcessError::bad_activity("cannot update an object without id"))?;
		let as_actor = activity.actor_iri()
			.ok_or_else(|| ProcessError::bad_activity("activity carries no actor"))?;
		if !engine.backend().is_from_outbox(&as_actor, id) {
			return Err(ProcessError::NotFromOutbox);
		}
		Ok(())
	}

	async fn post_outbox(&self, engine: &Engine, activity: &Activity) -> Result<()> {
		engine.backend().outbox_update(activity).await
	}
}
