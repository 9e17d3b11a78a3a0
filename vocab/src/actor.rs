use crate::{getter, setter, Node, Object, ObjectMut};

pub trait Actor: Object {
	fn preferred_username(&self) -> Option<&str> { None }
	fn inbox(&self) -> Node { Node::Empty }
	fn outbox(&self) -> Node { Node::Empty }
	fn following(&self) -> Node { Node::Empty }
	fn followers(&self) -> Node { Node::Empty }
	fn endpoints(&self) -> Node { Node::Empty }
	fn public_key(&self) -> Node { Node::Empty }
	fn manually_approves_followers(&self) -> Option<bool> { None }

	/// the instance-wide delivery endpoint, preferred over the per-actor inbox
	fn shared_inbox(&self) -> Option<&str> { None }
}

pub trait ActorMut: ObjectMut {
	fn set_preferred_username(self, val: Option<&str>) -> Self;
	fn set_inbox(self, val: Node) -> Self;
	fn set_outbox(self, val: Node) -> Self;
	fn set_following(self, val: Node) -> Self;
	fn set_followers(self, val: Node) -> Self;
	fn set_public_key(self, val: Node) -> Self;
	fn set_shared_inbox(self, val: Option<&str>) -> Self;
}

impl Actor for serde_json::Value {
	getter! { preferred_username::preferredUsername -> &str }
	getter! { inbox -> node }
	getter! { outbox -> node }
	getter! { following -> node }
	getter! { followers -> node }
	getter! { endpoints -> node }
	getter! { public_key::publicKey -> node }
	getter! { manually_approves_followers::manuallyApprovesFollowers -> bool }

	fn shared_inbox(&self) -> Option<&str> {
		self.get("endpoints")?.get("sharedInbox")?.as_str()
	}
}

impl ActorMut for serde_json::Value {
	setter! { preferred_username::preferredUsername -> &str }
	setter! { inbox -> node }
	setter! { outbox -> node }
	setter! { following -> node }
	setter! { followers -> node }
	setter! { public_key::publicKey -> node }

	fn set_shared_inbox(mut self, val: Option<&str>) -> Self {
		if let Some(inbox) = val {
			crate::macros::set_maybe_value(
				&mut self, "endpoints", Some(serde_json::json!({ "sharedInbox": inbox })),
			);
		}
		self
	}
}

#[cfg(test)]
mod test {
	use super::Actor;

	#[test]
	fn shared_inbox_reads_through_endpoints() {
		let actor = serde_json::json!({
			"id": "https://example.net/alice",
			"type": "Person",
			"inbox": "https://example.net/alice/inbox",
			"endpoints": { "sharedInbox": "https://example.net/inbox" },
		});
		assert_eq!(actor.shared_inbox(), Some("https://example.net/inbox"));
		assert_eq!(actor.inbox().id(), Some("https://example.net/alice/inbox"));

		let bare = serde_json::json!({"id": "x", "type": "Person"});
		assert!(bare.shared_inbox().is_none());
	}
}
