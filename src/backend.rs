use std::sync::{Arc, OnceLock};

use crate::activity::Activity;
use crate::errors::{ProcessError, Result};

/// everything the engine needs from the embedding application: storage,
/// transport and side effects. fetching and delivery are the only two
/// operations with no sensible default.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
	/// base url of the local instance, no trailing slash
	fn base_url(&self) -> String;

	fn debug_mode(&self) -> bool {
		false
	}

	fn user_agent(&self) -> String {
		format!("casket/{}", crate::VERSION)
	}

	/// dereference a remote (or local) iri into its json document
	async fn fetch_iri(&self, iri: &str) -> Result<serde_json::Value>;

	/// deliver a finalized payload to one recipient inbox, signing as the
	/// given local actor
	async fn post_to_remote_inbox(&self, as_actor: &str, payload: &serde_json::Value, recipient: &str) -> Result<()>;

	fn random_object_id(&self) -> String {
		uuid::Uuid::new_v4().simple().to_string()
	}

	fn activity_url(&self, obj_id: &str) -> String {
		format!("{}/outbox/{obj_id}", self.base_url())
	}

	fn note_url(&self, obj_id: &str) -> String {
		format!("{}/note/{obj_id}", self.base_url())
	}

	/// inboxes every outgoing Create is delivered to regardless of addressing,
	/// e.g. relays
	fn extra_inboxes(&self) -> Vec<String> {
		Vec::new()
	}

	/// whether the given iri was minted by the local actor's outbox. the
	/// default ignores the actor and checks the instance prefix, multi-actor
	/// embedders scope it further.
	fn is_from_outbox(&self, _as_actor: &str, iri: &str) -> bool {
		iri.starts_with(&self.base_url())
	}

	async fn outbox_is_blocked(&self, _as_actor: &str, _actor_iri: &str) -> Result<bool> {
		Ok(false)
	}

	async fn inbox_check_duplicate(&self, _as_actor: &str, _iri: &str) -> Result<bool> {
		Ok(false)
	}

	/// persist an activity that passed inbox processing
	async fn inbox_new(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	/// persist an activity minted by the local outbox
	async fn outbox_new(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn new_follower(&self, _follow: &Activity) -> Result<()> {
		Ok(())
	}

	async fn undo_new_follower(&self, _follow: &Activity) -> Result<()> {
		Ok(())
	}

	async fn new_following(&self, _follow: &Activity) -> Result<()> {
		Ok(())
	}

	async fn undo_new_following(&self, _follow: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_create(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_create(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_like(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_like(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_undo_like(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_undo_like(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_announce(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_announce(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_undo_announce(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_undo_announce(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_delete(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_delete(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn inbox_update(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}

	async fn outbox_update(&self, _activity: &Activity) -> Result<()> {
		Ok(())
	}
}

// process-wide backend for callers that don't want to thread an engine
// around. optional: an engine can always be built around an explicit backend.
static AMBIENT: OnceLock<Arc<dyn Backend>> = OnceLock::new();

/// install the process-wide backend, once. returns false if one was
/// already installed.
pub fn install(backend: Arc<dyn Backend>) -> bool {
	AMBIENT.set(backend).is_ok()
}

pub(crate) fn ambient() -> Result<Arc<dyn Backend>> {
	AMBIENT.get().cloned().ok_or(ProcessError::UninitializedBackend)
}
