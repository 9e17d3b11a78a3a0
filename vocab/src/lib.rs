mod macros;
pub(crate) use macros::{strenum, getter, setter};
pub use macros::TypeValueError;

mod node;
pub use node::Node;

mod types;
pub use types::{ActivityType, ActorType, CollectionType, ObjectType, VerbType};

mod object;
pub use object::{Base, BaseMut, Object, ObjectMut};

mod activity;
pub use activity::{Activity, ActivityMut};

mod actor;
pub use actor::{Actor, ActorMut};

mod collection;
pub use collection::{Collection, CollectionMut};

mod key;
pub use key::{PublicKey, PublicKeyMut};

pub mod target;
pub use target::Addressed;
