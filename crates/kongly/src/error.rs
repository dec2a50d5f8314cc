//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError` and `LinkError` into user-facing errors
//! with actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use kongly_config::ConfigError;
use kongly_core::{CoreError, LinkError, ResourceKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const LINK_EXPIRED: i32 = 9;
    pub const LINK_INVALID: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Admin API during {kind} {operation}")]
    #[diagnostic(
        code(kongly::connection_failed),
        help(
            "Check that the gateway is running and its Admin API is reachable.\n\
             Self-signed certificate? Use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        kind: ResourceKind,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Gateway error (HTTP {status}): {message}")]
    #[diagnostic(
        code(kongly::server_fault),
        help("The gateway failed to handle the request. Check its error log.")
    )]
    ServerFault { status: u16, message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Admin API refused the request (HTTP {status}): {message}")]
    #[diagnostic(
        code(kongly::auth_failed),
        help(
            "Provide an admin token with --admin-token or KONGLY_ADMIN_TOKEN,\n\
             or store one with: kongly config set-secret admin-token"
        )
    )]
    AuthFailed { status: u16, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{kind} '{identifier}' not found")]
    #[diagnostic(
        code(kongly::not_found),
        help("Run: kongly {list_command} list to see available {list_command}")
    )]
    NotFound {
        kind: ResourceKind,
        identifier: String,
        list_command: &'static str,
    },

    #[error("{kind} '{identifier}' conflicts with existing state: {message}")]
    #[diagnostic(
        code(kongly::conflict),
        help("{hint}")
    )]
    Conflict {
        kind: ResourceKind,
        identifier: String,
        message: String,
        hint: String,
    },

    #[error("Gateway rejected the {kind} {operation}: {message}")]
    #[diagnostic(code(kongly::rejected))]
    Rejected {
        kind: ResourceKind,
        operation: String,
        message: String,
    },

    // ── Signed links ─────────────────────────────────────────────────
    #[error("Link expired at {expires_at} (now {now})")]
    #[diagnostic(
        code(kongly::link_expired),
        help("Sign the path again with a later --expires or a longer --ttl.")
    )]
    LinkExpired { expires_at: i64, now: i64 },

    #[error("Link signature does not match")]
    #[diagnostic(
        code(kongly::link_invalid),
        help("The link was altered, or signed with a different secret.")
    )]
    LinkInvalid,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(kongly::validation))]
    Validation { field: String, reason: String },

    #[error("Operation not supported: {message}")]
    #[diagnostic(code(kongly::unsupported))]
    Unsupported { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(kongly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: kongly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No gateway configured")]
    #[diagnostic(
        code(kongly::no_config),
        help(
            "Create a profile with: kongly config init\n\
             Or pass --admin http://127.0.0.1:8001\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("No {what} configured")]
    #[diagnostic(
        code(kongly::no_secret),
        help("Pass --secret, set KONGLY_LINK_SECRET, or run: kongly config set-secret link-secret")
    )]
    MissingSecret { what: String },

    #[error(transparent)]
    #[diagnostic(code(kongly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(kongly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(kongly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(kongly::render))]
    Render(String),

    #[error("{0}")]
    #[diagnostic(code(kongly::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::LinkExpired { .. } => exit_code::LINK_EXPIRED,
            Self::LinkInvalid => exit_code::LINK_INVALID,
            Self::Validation { .. }
            | Self::Unsupported { .. }
            | Self::Rejected { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound {
                kind, identifier, ..
            } => CliError::NotFound {
                kind,
                identifier,
                list_command: kind.collection(),
            },

            CoreError::Conflict {
                kind,
                identifier,
                operation,
                message,
                fields,
            } => {
                let hint = if operation == kongly_core::Operation::Delete {
                    "Other entities still reference it; remove or repoint them first.".to_owned()
                } else if fields.is_empty() {
                    "Use `upsert` to replace the existing entity.".to_owned()
                } else {
                    let names: Vec<_> = fields.keys().map(String::as_str).collect();
                    format!("Already taken: {}. Use `upsert` to replace.", names.join(", "))
                };
                CliError::Conflict {
                    kind,
                    identifier,
                    message,
                    hint,
                }
            }

            CoreError::BadRequest {
                kind,
                operation,
                message,
                fields,
            } => {
                let message = if fields.is_empty() {
                    message
                } else {
                    let detail: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    format!("{message} ({})", detail.join("; "))
                };
                CliError::Rejected {
                    kind,
                    operation: operation.to_string(),
                    message,
                }
            }

            CoreError::Unauthorized {
                status, message, ..
            } => CliError::AuthFailed { status, message },

            CoreError::ServerFault {
                status, message, ..
            } => CliError::ServerFault { status, message },

            CoreError::TransportFailure {
                kind,
                operation,
                source,
            } => CliError::ConnectionFailed {
                kind,
                operation: operation.to_string(),
                source: Box::new(source),
            },

            CoreError::MissingNaturalKey { kind, field, .. } => CliError::Validation {
                field: field.into(),
                reason: format!("{kind} upsert needs --set {field}=..."),
            },

            CoreError::DuplicateKey { key } => CliError::Validation {
                field: key,
                reason: "given more than once".into(),
            },

            CoreError::InvalidAttributes(err) => CliError::Validation {
                field: "attributes".into(),
                reason: err.to_string(),
            },

            CoreError::Unsupported { message } => CliError::Unsupported { message },

            CoreError::Config { message } => CliError::Validation {
                field: "gateway".into(),
                reason: message,
            },

            CoreError::Deserialization { kind, message } => {
                CliError::Internal(format!("unexpected {kind} payload: {message}"))
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name } => {
                let available = kongly_config::load_config_or_default()
                    .profiles
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available
                    },
                }
            }
            ConfigError::MissingSecret { what, .. } => CliError::MissingSecret {
                what: what.to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

impl From<LinkError> for CliError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Expired { expires_at, now } => CliError::LinkExpired { expires_at, now },
            LinkError::InvalidSignature => CliError::LinkInvalid,
            LinkError::Malformed { reason } => CliError::Validation {
                field: "url".into(),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use kongly_core::Operation;

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let not_found = CliError::from(CoreError::NotFound {
            kind: ResourceKind::Service,
            identifier: "svc_a".into(),
            operation: Operation::Retrieve,
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(not_found.to_string(), "service 'svc_a' not found");

        let conflict = CliError::from(CoreError::Conflict {
            kind: ResourceKind::Service,
            identifier: "svc_a".into(),
            operation: Operation::Create,
            message: "unique constraint violation".into(),
            fields: BTreeMap::from([("name".into(), "already exists".into())]),
        });
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);

        let auth = CliError::from(CoreError::Unauthorized {
            kind: ResourceKind::Plugin,
            operation: Operation::List,
            status: 401,
            message: "Invalid credentials".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn link_errors_keep_their_own_codes() {
        let expired = CliError::from(LinkError::Expired {
            expires_at: 10,
            now: 11,
        });
        assert_eq!(expired.exit_code(), exit_code::LINK_EXPIRED);
        assert_eq!(
            CliError::from(LinkError::InvalidSignature).exit_code(),
            exit_code::LINK_INVALID
        );
        let malformed = CliError::from(LinkError::Malformed {
            reason: "missing st".into(),
        });
        assert_eq!(malformed.exit_code(), exit_code::USAGE);
    }
}
