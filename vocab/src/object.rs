use crate::{getter, setter, ActivityType, Node};

pub trait Base {
	fn id(&self) -> Option<&str> { None }
	fn activity_type(&self) -> Option<ActivityType> { None }
}

pub trait BaseMut {
	fn set_id(self, val: Option<&str>) -> Self;
	fn set_activity_type(self, val: Option<ActivityType>) -> Self;
}

impl Base for String {
	fn id(&self) -> Option<&str> {
		Some(self)
	}
}

impl Base for serde_json::Value {
	getter! { id -> &str }
	getter! { activity_type -> type ActivityType }
}

impl BaseMut for serde_json::Value {
	setter! { id -> &str }
	setter! { activity_type -> type ActivityType }
}

pub trait Object: Base {
	fn attributed_to(&self) -> Node { Node::Empty }
	fn name(&self) -> Option<&str> { None }
	fn content(&self) -> Option<&str> { None }
	fn summary(&self) -> Option<&str> { None }
	fn published(&self) -> Option<chrono::DateTime<chrono::Utc>> { None }
	fn updated(&self) -> Option<chrono::DateTime<chrono::Utc>> { None }
	fn deleted(&self) -> Option<chrono::DateTime<chrono::Utc>> { None }
	fn in_reply_to(&self) -> Node { Node::Empty }
	fn tag(&self) -> Node { Node::Empty }
	fn url(&self) -> Node { Node::Empty }
	fn to(&self) -> Node { Node::Empty }
	fn bto(&self) -> Node { Node::Empty }
	fn cc(&self) -> Node { Node::Empty }
	fn bcc(&self) -> Node { Node::Empty }
	fn audience(&self) -> Node { Node::Empty }
	fn media_type(&self) -> Option<&str> { None }
	fn sensitive(&self) -> Option<bool> { None }
}

pub trait ObjectMut: BaseMut {
	fn set_attributed_to(self, val: Node) -> Self;
	fn set_name(self, val: Option<&str>) -> Self;
	fn set_content(self, val: Option<&str>) -> Self;
	fn set_summary(self, val: Option<&str>) -> Self;
	fn set_published(self, val: Option<chrono::DateTime<chrono::Utc>>) -> Self;
	fn set_updated(self, val: Option<chrono::DateTime<chrono::Utc>>) -> Self;
	fn set_deleted(self, val: Option<chrono::DateTime<chrono::Utc>>) -> Self;
	fn set_in_reply_to(self, val: Node) -> Self;
	fn set_tag(self, val: Node) -> Self;
	fn set_url(self, val: Node) -> Self;
	fn set_to(self, val: Node) -> Self;
	fn set_bto(self, val: Node) -> Self;
	fn set_cc(self, val: Node) -> Self;
	fn set_bcc(self, val: Node) -> Self;
	fn set_audience(self, val: Node) -> Self;
	fn set_media_type(self, val: Option<&str>) -> Self;
	fn set_sensitive(self, val: Option<bool>) -> Self;
}

impl Object for serde_json::Value {
	getter! { attributed_to::attributedTo -> node }
	getter! { name -> &str }
	getter! { content -> &str }
	getter! { summary -> &str }
	getter! { published -> chrono::DateTime<chrono::Utc> }
	getter! { updated -> chrono::DateTime<chrono::Utc> }
	getter! { deleted -> chrono::DateTime<chrono::Utc> }
	getter! { in_reply_to::inReplyTo -> node }
	getter! { tag -> node }
	getter! { url -> node }
	getter! { to -> node }
	getter! { bto -> node }
	getter! { cc -> node }
	getter! { bcc -> node }
	getter! { audience -> node }
	getter! { media_type::mediaType -> &str }
	getter! { sensitive -> bool }
}

impl ObjectMut for serde_json::Value {
	setter! { attributed_to::attributedTo -> node }
	setter! { name -> &str }
	setter! { content -> &str }
	setter! { summary -> &str }
	setter! { published -> chrono::DateTime<chrono::Utc> }
	setter! { updated -> chrono::DateTime<chrono::Utc> }
	setter! { deleted -> chrono::DateTime<chrono::Utc> }
	setter! { in_reply_to::inReplyTo -> node }
	setter! { tag -> node }
	setter! { url -> node }
	setter! { to -> node }
	setter! { bto -> node }
	setter! { cc -> node }
	setter! { bcc -> node }
	setter! { audience -> node }
	setter! { media_type::mediaType -> &str }
	setter! { sensitive -> bool }
}
