// kongly-api: Async Rust client for the Kong gateway Admin API

pub mod client;
pub mod error;
pub mod models;
pub mod params;
pub mod transport;

pub use client::AdminClient;
pub use error::Error;
pub use models::{EnabledPlugins, ErrorBody, ListEnvelope};
pub use params::{Attributes, ParamError};
pub use transport::{TlsMode, TransportConfig};
