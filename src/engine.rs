use std::sync::{Arc, Mutex};

use vocab::{ActivityType, Node, VerbType};
use vocab::{Base as _, Actor as _};

use crate::activity::Activity;
use crate::backend::{self, Backend};
use crate::behavior::{behavior, InboxDecision};
use crate::builders;
use crate::collection;
use crate::errors::{ProcessError, Result};
use crate::guard::UrlGuard;

/// ties a backend and a url guard together and runs the two protocol state
/// machines: box processing and delivery. holds no protocol state itself, so
/// it is cheap to build one per request.
pub struct Engine {
	backend: Arc<dyn Backend>,
	guard: UrlGuard,
}

impl Engine {
	pub fn new(backend: Arc<dyn Backend>) -> Self {
		let guard = UrlGuard::new(backend.debug_mode());
		Engine { backend, guard }
	}

	pub fn with_guard(backend: Arc<dyn Backend>, guard: UrlGuard) -> Self {
		Engine { backend, guard }
	}

	/// build an engine around the process-wide backend, if one was installed
	pub fn ambient() -> Result<Self> {
		Ok(Self::new(backend::ambient()?))
	}

	pub fn backend(&self) -> &dyn Backend {
		self.backend.as_ref()
	}

	pub fn guard(&self) -> &UrlGuard {
		&self.guard
	}

	/// guarded dereference: every remote fetch funnels through here
	pub async fn fetch_document(&self, iri: &str) -> Result<serde_json::Value> {
		self.guard.check(iri)?;
		self.backend.fetch_iri(iri).await
	}

	pub async fn fetch_activity(&self, iri: &str) -> Result<Activity> {
		Activity::parse(self.fetch_document(iri).await?)
	}

	pub async fn fetch_activity_expected(
		&self,
		iri: &str,
		pred: fn(&ActivityType) -> bool,
		expected: &'static str,
	) -> Result<Activity> {
		Activity::parse_expected(self.fetch_document(iri).await?, pred, expected)
	}

	/// dereference the activity's actor, at most once per activity
	pub async fn resolve_actor<'a>(&self, activity: &'a Activity) -> Result<&'a Activity> {
		if let Some(cached) = activity.cached_actor() {
			return Ok(cached);
		}
		let iri = activity.actor_iri()
			.ok_or_else(|| ProcessError::bad_activity("activity carries no actor"))?;
		let actor = self.fetch_activity_expected(&iri, ActivityType::is_actor, "an actor").await?;
		Ok(activity.cache_actor(actor))
	}

	/// dereference the activity's object, from the embedded document if there
	/// is one, over the wire otherwise. cached like the actor.
	pub async fn resolve_object<'a>(&self, activity: &'a Activity) -> Result<&'a Activity> {
		if let Some(cached) = activity.cached_object() {
			return Ok(cached);
		}
		let resolved = match activity.object_node() {
			Node::Empty => return Err(ProcessError::bad_activity("activity carries no object")),
			Node::Link(iri) => self.fetch_activity(&iri).await?,
			node => match node.extract() {
				Some(obj) => Activity::parse(obj)?,
				None => return Err(ProcessError::bad_activity("activity carries no object")),
			},
		};
		Ok(activity.cache_object(resolved))
	}

	/// validate a payload handed to us by a remote server: structure first,
	/// then the actor must actually dereference to an actor document
	pub async fn parse_incoming(&self, payload: serde_json::Value) -> Result<Activity> {
		let activity = Activity::parse_expected(payload, ActivityType::is_verb, "an activity")?;
		self.resolve_actor(&activity).await?;
		Ok(activity)
	}

	/// inbox state machine, run on behalf of the local actor whose inbox
	/// received the payload. blocked, duplicate and dropped activities are
	/// swallowed on purpose: answering them would leak state to strangers.
	pub async fn process_from_inbox(&self, as_actor: &str, payload: serde_json::Value) -> Result<()> {
		let activity = Activity::parse_expected(payload, ActivityType::is_verb, "an activity")?;
		self.resolve_actor(&activity).await?;
		let actor_iri = activity.actor_iri()
			.ok_or_else(|| ProcessError::bad_activity("activity carries no actor"))?;

		if self.backend.outbox_is_blocked(as_actor, &actor_iri).await? {
			tracing::info!("dropping activity from actor {actor_iri}, blocked by {as_actor}");
			return Ok(());
		}

		if let Some(id) = activity.id() {
			if self.backend.inbox_check_duplicate(as_actor, id).await? {
				tracing::debug!("skipping already processed activity {id}");
				return Ok(());
			}
		}

		let verb = behavior(activity.kind());
		if let InboxDecision::Drop(reason) = verb.pre_process_inbox(self, &activity).await? {
			tracing::info!("dropping inbox activity: {reason}");
			return Ok(());
		}

		self.backend.inbox_new(&activity).await?;
		verb.process_inbox(self, &activity).await
	}

	/// outbox state machine: mint an id, store, deliver. bare content objects
	/// get wrapped in a Create first and the minted id flows back into the
	/// caller's activity.
	#[async_recursion::async_recursion]
	pub async fn post_to_outbox(&self, activity: &mut Activity) -> Result<String> {
		if activity.kind().is_creatable() {
			let source = Arc::new(Mutex::new(activity.to_value()));
			let mut create = builders::build_create(&source)?;
			let iri = self.post_to_outbox(&mut create).await?;
			let updated = source.lock()
				.map_err(|_| ProcessError::bad_activity("source object lock poisoned"))?
				.clone();
			*activity = Activity::parse(updated)?;
			return Ok(iri);
		}

		let obj_id = self.backend.random_object_id();
		let iri = self.backend.activity_url(&obj_id);
		activity.set_id(&iri, &obj_id, self.backend.as_ref());

		let verb = behavior(activity.kind());
		verb.pre_post_outbox(self, activity).await?;
		self.backend.outbox_new(activity).await?;

		let as_actor = activity.actor_iri()
			.ok_or_else(|| ProcessError::bad_activity("activity carries no actor"))?;
		let recipients = self.recipients(activity).await?;
		let payload = activity.clean_for_delivery();
		verb.post_outbox(self, activity).await?;

		for recipient in recipients {
			// one unreachable server must not starve the others
			if let Err(e) = self.backend.post_to_remote_inbox(&as_actor, &payload, &recipient).await {
				tracing::warn!("delivery to {recipient} failed: {e}");
			}
		}

		Ok(iri)
	}

	/// final inbox urls for an activity, deduplicated, shared inboxes
	/// preferred, the author itself excluded
	pub async fn recipients(&self, activity: &Activity) -> Result<Vec<String>> {
		let targets = behavior(activity.kind()).recipients(self, activity).await?;
		let mut out = Vec::new();
		if activity.kind() == ActivityType::Verb(VerbType::Create) {
			out.extend(self.backend.extra_inboxes());
		}
		let self_id = activity.actor_iri();
		self.resolve_inboxes(&targets, self_id.as_deref(), &mut out, true).await?;
		Ok(out)
	}

	#[async_recursion::async_recursion]
	async fn resolve_inboxes(
		&self,
		targets: &[String],
		self_id: Option<&str>,
		out: &mut Vec<String>,
		expand: bool,
	) -> Result<()> {
		for target in targets {
			if target == vocab::target::PUBLIC || Some(target.as_str()) == self_id {
				continue;
			}
			let doc = match self.fetch_document(target).await {
				Ok(doc) => doc,
				Err(e) if e.is_remote_miss() || matches!(e, ProcessError::InvalidUrl(_)) => {
					tracing::warn!("skipping unreachable recipient {target}: {e}");
					continue;
				},
				Err(e) => return Err(e),
			};
			match doc.activity_type() {
				Some(kind) if kind.is_actor() => {
					let inbox = doc.shared_inbox()
						.map(str::to_string)
						.or_else(|| doc.inbox().id().map(str::to_string));
					match inbox {
						Some(inbox) => {
							if !out.contains(&inbox) {
								out.push(inbox);
							}
						},
						None => tracing::warn!("actor {target} exposes no inbox"),
					}
				},
				Some(kind) if kind.is_collection() && expand => {
					// one level deep: followers of followers is not addressing
					let members = collection::parse_collection(self, doc).await?;
					let ids: Vec<String> = members.into_iter()
						.filter_map(|x| Node::from(x).id().map(str::to_string))
						.collect();
					self.resolve_inboxes(&ids, self_id, out, false).await?;
				},
				_ => tracing::warn!("recipient {target} is neither actor nor collection, skipping"),
			}
		}
		Ok(())
	}
}
