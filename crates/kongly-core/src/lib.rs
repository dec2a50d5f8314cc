// kongly-core: resource model and operations for the Kong Admin API
//
// Sits between the raw HTTP layer (kongly-api) and consumers (CLI, scripts).
// Provides one generic `ResourceClient` for every entity kind, lazy
// paginated traversal, and nginx-compatible signed download links.

pub mod config;
pub mod cursor;
pub mod error;
pub mod gateway;
pub mod model;
pub mod resources;
pub mod securelink;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{GatewayConfig, TlsVerification};
pub use cursor::PageCursor;
pub use error::{CoreError, Operation};
pub use gateway::Gateway;
pub use resources::{MAX_PAGE_SIZE, ResourceClient};
pub use securelink::{LinkError, SecureLinkSigner, SignedLink};

// ── Model re-exports ────────────────────────────────────────────────
pub use model::{Identifier, Page, Reference, Resource, ResourceKind};

// Attribute maps and their key syntax live in the HTTP layer.
pub use kongly_api::params::{decode, decode_assignments, encode};
pub use kongly_api::{Attributes, ParamError};
