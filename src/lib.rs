//! transport-agnostic activitypub processing: validation, inbox/outbox state
//! machines, addressing, http signatures. bring your own storage and http
//! client by implementing [`Backend`].

pub use vocab;

pub mod activity;
pub mod backend;
mod behavior;
pub mod builders;
pub mod collection;
pub mod engine;
pub mod errors;
pub mod guard;
pub mod key;
pub mod signing;

pub use activity::Activity;
pub use backend::{install, Backend};
pub use collection::{parse_collection, parse_collection_url};
pub use engine::Engine;
pub use errors::{ProcessError, Result};
pub use guard::UrlGuard;
pub use key::Key;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
