// ── Core error types ──
//
// Resource-level errors from kongly-core. Consumers never see raw HTTP
// statuses: every `kongly_api::Error` is translated into the taxonomy
// below together with the kind, operation and identifier it concerns.

use std::collections::BTreeMap;

use kongly_api::ParamError;
use strum::Display;
use thiserror::Error;

use crate::model::ResourceKind;

/// The resource operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Retrieve,
    List,
    Update,
    Upsert,
    Delete,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote outcomes ──────────────────────────────────────────────
    #[error("{kind} '{identifier}' not found ({operation})")]
    NotFound {
        kind: ResourceKind,
        identifier: String,
        operation: Operation,
    },

    /// Unique-attribute collision, or delete blocked by a live reference.
    #[error("{kind} '{identifier}' {operation} conflict: {message}")]
    Conflict {
        kind: ResourceKind,
        identifier: String,
        operation: Operation,
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// Malformed parameter or payload, including stale pagination cursors.
    #[error("{kind} {operation} rejected: {message}")]
    BadRequest {
        kind: ResourceKind,
        operation: Operation,
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("{kind} {operation} not authorized (HTTP {status}): {message}")]
    Unauthorized {
        kind: ResourceKind,
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("gateway failed during {kind} {operation} (HTTP {status}): {message}")]
    ServerFault {
        kind: ResourceKind,
        operation: Operation,
        status: u16,
        message: String,
    },

    /// No HTTP status was obtained (connect, DNS, timeout, TLS).
    #[error("transport failure during {kind} {operation}: {source}")]
    TransportFailure {
        kind: ResourceKind,
        operation: Operation,
        #[source]
        source: kongly_api::Error,
    },

    // ── Local validation ─────────────────────────────────────────────
    #[error("{kind} {operation} requires the natural key attribute '{field}'")]
    MissingNaturalKey {
        kind: ResourceKind,
        operation: Operation,
        field: &'static str,
    },

    /// The same plain key was given twice in one request.
    #[error("duplicate key '{key}' in the same request")]
    DuplicateKey { key: String },

    #[error("invalid attributes: {0}")]
    InvalidAttributes(ParamError),

    #[error("unsupported: {message}")]
    Unsupported { message: String },

    // ── Data / setup ─────────────────────────────────────────────────
    #[error("unexpected {kind} payload: {message}")]
    Deserialization { kind: ResourceKind, message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if retrying the same call might succeed.
    ///
    /// The core never retries on its own; this is for callers that do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TransportFailure { source, .. } => source.is_transient(),
            Self::ServerFault { status, .. } => *status == 502 || *status == 503 || *status == 504,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<ParamError> for CoreError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::DuplicateKey(key) => Self::DuplicateKey { key },
            other => Self::InvalidAttributes(other),
        }
    }
}

/// What a failed call was doing, for error translation.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub kind: ResourceKind,
    pub operation: Operation,
    pub identifier: Option<String>,
}

impl Context {
    pub(crate) fn new(kind: ResourceKind, operation: Operation) -> Self {
        Self {
            kind,
            operation,
            identifier: None,
        }
    }

    pub(crate) fn with_identifier(mut self, identifier: impl ToString) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    fn identifier(&self) -> String {
        self.identifier.clone().unwrap_or_else(|| "(new)".into())
    }

    /// Translate a transport-layer error for this call.
    pub(crate) fn translate(&self, err: kongly_api::Error) -> CoreError {
        let kind = self.kind;
        let operation = self.operation;
        match err {
            kongly_api::Error::Api {
                status,
                message,
                fields,
            } => match status {
                404 => CoreError::NotFound {
                    kind,
                    identifier: self.identifier(),
                    operation,
                },
                409 => CoreError::Conflict {
                    kind,
                    identifier: self.identifier(),
                    operation,
                    message,
                    fields,
                },
                401 | 403 => CoreError::Unauthorized {
                    kind,
                    operation,
                    status,
                    message,
                },
                500.. => CoreError::ServerFault {
                    kind,
                    operation,
                    status,
                    message,
                },
                _ => CoreError::BadRequest {
                    kind,
                    operation,
                    message,
                    fields,
                },
            },
            kongly_api::Error::Transport(ref e) if e.status().is_some() => {
                let status = e.status().map_or(0, |s| s.as_u16());
                CoreError::ServerFault {
                    kind,
                    operation,
                    status,
                    message: e.to_string(),
                }
            }
            err @ (kongly_api::Error::Transport(_) | kongly_api::Error::Tls(_)) => {
                CoreError::TransportFailure {
                    kind,
                    operation,
                    source: err,
                }
            }
            kongly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            kongly_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("admin URL cannot be used as a base: {url}"),
            },
            kongly_api::Error::InvalidToken(reason) => CoreError::Config {
                message: format!("invalid admin token: {reason}"),
            },
            kongly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Deserialization { kind, message }
            }
            kongly_api::Error::Params(e) => CoreError::from(e),
        }
    }
}
