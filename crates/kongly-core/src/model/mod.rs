// ── Domain model ──

mod identifier;
mod kind;
mod resource;

pub use identifier::Identifier;
pub use kind::ResourceKind;
pub use resource::{Page, Reference, Resource};
pub(crate) use resource::scalar_key;
