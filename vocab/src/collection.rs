use crate::{getter, setter, Node, Object, ObjectMut};

// page fields are folded in: every page is itself a collection document
pub trait Collection: Object {
	fn total_items(&self) -> Option<u64> { None }
	fn first(&self) -> Node { Node::Empty }
	fn last(&self) -> Node { Node::Empty }
	fn current(&self) -> Node { Node::Empty }
	fn items(&self) -> Node { Node::Empty }
	fn ordered_items(&self) -> Node { Node::Empty }
	fn next(&self) -> Node { Node::Empty }
	fn prev(&self) -> Node { Node::Empty }
	fn part_of(&self) -> Node { Node::Empty }
}

pub trait CollectionMut: ObjectMut {
	fn set_total_items(self, val: Option<u64>) -> Self;
	fn set_first(self, val: Node) -> Self;
	fn set_last(self, val: Node) -> Self;
	fn set_current(self, val: Node) -> Self;
	fn set_items(self, val: Node) -> Self;
	fn set_ordered_items(self, val: Node) -> Self;
	fn set_next(self, val: Node) -> Self;
	fn set_prev(self, val: Node) -> Self;
	fn set_part_of(self, val: Node) -> Self;
}

impl Collection for serde_json::Value {
	getter! { total_items::totalItems -> u64 }
	getter! { first -> node }
	getter! { last -> node }
	getter! { current -> node }
	getter! { items -> node }
	getter! { ordered_items::orderedItems -> node }
	getter! { next -> node }
	getter! { prev -> node }
	getter! { part_of::partOf -> node }
}

impl CollectionMut for serde_json::Value {
	setter! { total_items::totalItems -> u64 }
	setter! { first -> node }
	setter! { last -> node }
	setter! { current -> node }
	setter! { items -> node }
	setter! { ordered_items::orderedItems -> node }
	setter! { next -> node }
	setter! { prev -> node }
	setter! { part_of::partOf -> node }
}
