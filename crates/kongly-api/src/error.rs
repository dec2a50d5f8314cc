use std::collections::BTreeMap;

use thiserror::Error;

use crate::params::ParamError;

/// Top-level error type for the `kongly-api` crate.
///
/// Covers every failure mode of a single Admin API exchange: transport,
/// URL construction, non-success statuses and body decoding.
/// `kongly-core` maps these into the resource-level taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The admin base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Admin URL cannot be used as a base: {0}")]
    InvalidBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Admin token could not be turned into a header value.
    #[error("Invalid admin token: {0}")]
    InvalidToken(String),

    // ── Admin API ───────────────────────────────────────────────────
    /// Non-success status from the Admin API.
    ///
    /// `fields` holds the per-field messages the gateway keys by the
    /// offending attribute name (e.g. `name -> already exists with value 'x'`).
    #[error("Admin API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        fields: BTreeMap<String, String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Attribute pairs could not be turned into an attribute map.
    #[error(transparent)]
    Params(#[from] ParamError),
}

impl Error {
    /// HTTP status of the failed exchange, if one was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the failure happened before any HTTP status arrived.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(e) => e.status().is_none(),
            Self::Tls(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the gateway reported a uniqueness or reference conflict.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
