// ── Runtime connection configuration ──
//
// These types describe *how* to reach a gateway's Admin API. They carry
// the admin token and connection tuning, but never touch disk: the CLI
// builds a `GatewayConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use kongly_api::{TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed admin listeners).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single gateway.
///
/// Built by the CLI, passed to `Gateway::new` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Admin API base URL (e.g., `http://127.0.0.1:8001`).
    pub admin_url: Url,
    /// Sent as `Kong-Admin-Token` when the Admin API is RBAC-protected.
    pub admin_token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(admin_url: Url) -> Self {
        Self {
            admin_url,
            admin_token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_admin_token(mut self, token: SecretString) -> Self {
        self.admin_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            admin_token: self.admin_token.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_tls_and_thirty_seconds() {
        let cfg = GatewayConfig::new("http://127.0.0.1:8001".parse().unwrap());
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        let transport = cfg.transport();
        assert!(matches!(transport.tls, TlsMode::System));
        assert_eq!(transport.timeout, Duration::from_secs(30));
        assert!(transport.admin_token.is_none());
    }

    #[test]
    fn tls_choice_carries_into_transport() {
        let cfg = GatewayConfig::new("https://admin.internal:8444".parse().unwrap())
            .with_tls(TlsVerification::CustomCa("/etc/kong/ca.pem".into()))
            .with_timeout(Duration::from_secs(5));
        let transport = cfg.transport();
        assert!(matches!(transport.tls, TlsMode::CustomCa(ref p) if p.ends_with("ca.pem")));
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }
}
