use crate::{getter, setter, Node, Object, ObjectMut};

pub trait Activity: Object {
	fn actor(&self) -> Node { Node::Empty }
	fn object(&self) -> Node { Node::Empty }
	fn target(&self) -> Node { Node::Empty }
}

pub trait ActivityMut: ObjectMut {
	fn set_actor(self, val: Node) -> Self;
	fn set_object(self, val: Node) -> Self;
	fn set_target(self, val: Node) -> Self;
}

impl Activity for serde_json::Value {
	getter! { actor -> node }
	getter! { object -> node }
	getter! { target -> node }
}

impl ActivityMut for serde_json::Value {
	setter! { actor -> node }
	setter! { object -> node }
	setter! { target -> node }
}
