//! Configuration for the kongly CLI.
//!
//! TOML profiles, secret resolution (env + keyring + plaintext), and
//! translation to `kongly_core::GatewayConfig`. The CLI layers its flag
//! overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use kongly_core::{GatewayConfig, TlsVerification};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name all secrets are stored under.
pub const KEYRING_SERVICE: &str = "kongly";

/// Environment prefix for config overrides (`KONGLY_DEFAULTS__TIMEOUT=5`).
pub const ENV_PREFIX: &str = "KONGLY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no {what} configured for profile '{profile}'")]
    MissingSecret { profile: String, what: SecretKind },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the default.
    pub fn profile_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named gateway profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Admin API base URL (e.g., "http://127.0.0.1:8001").
    pub admin_url: String,

    /// Public host signed download links are served from.
    pub link_base: Option<String>,

    /// Admin token (plaintext -- prefer keyring or env var).
    pub admin_token: Option<String>,

    /// Environment variable holding the admin token.
    pub admin_token_env: Option<String>,

    /// Signed-link secret (plaintext -- prefer keyring or env var).
    pub link_secret: Option<String>,

    /// Environment variable holding the signed-link secret.
    pub link_secret_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override `defaults.insecure`.
    pub insecure: Option<bool>,

    /// Override `defaults.timeout`.
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(admin_url: impl Into<String>) -> Self {
        Self {
            admin_url: admin_url.into(),
            link_base: None,
            admin_token: None,
            admin_token_env: None,
            link_secret: None,
            link_secret_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "kongly", "kongly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("kongly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (a missing file is fine) layered under `KONGLY_` env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secret resolution ───────────────────────────────────────────────

/// The secrets a profile can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    AdminToken,
    LinkSecret,
}

impl SecretKind {
    /// Keyring account suffix (`<profile>/admin-token`).
    pub fn key(self) -> &'static str {
        match self {
            Self::AdminToken => "admin-token",
            Self::LinkSecret => "link-secret",
        }
    }

    fn env_name(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::AdminToken => profile.admin_token_env.as_deref(),
            Self::LinkSecret => profile.link_secret_env.as_deref(),
        }
    }

    fn plaintext(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::AdminToken => profile.admin_token.as_deref(),
            Self::LinkSecret => profile.link_secret.as_deref(),
        }
    }
}

impl std::fmt::Display for SecretKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdminToken => f.write_str("admin token"),
            Self::LinkSecret => f.write_str("link secret"),
        }
    }
}

fn keyring_entry(profile_name: &str, kind: SecretKind) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{}", kind.key()))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Look a secret up: the profile's env var, then the system keyring,
/// then plaintext in the config file.
pub fn resolve_secret(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
) -> Option<SecretString> {
    resolve_secret_with(profile, profile_name, kind, |name| std::env::var(name).ok())
}

fn resolve_secret_with(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's *_env → env var lookup
    if let Some(val) = kind.env_name(profile).and_then(&env) {
        debug!(profile = profile_name, %kind, "secret from environment");
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(secret) = keyring_entry(profile_name, kind).and_then(|entry| {
        entry
            .get_password()
            .map_err(|e| ConfigError::Keyring(e.to_string()))
    }) {
        debug!(profile = profile_name, %kind, "secret from keyring");
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    kind.plaintext(profile)
        .map(|s| SecretString::from(s.to_owned()))
}

/// Like [`resolve_secret`], but a missing secret is an error.
pub fn require_secret(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
) -> Result<SecretString, ConfigError> {
    resolve_secret(profile, profile_name, kind).ok_or_else(|| ConfigError::MissingSecret {
        profile: profile_name.into(),
        what: kind,
    })
}

/// Store a secret in the system keyring for `profile_name`.
pub fn store_secret(profile_name: &str, kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, kind)?
        .set_password(value)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `GatewayConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_gateway_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<GatewayConfig, ConfigError> {
    let url: url::Url = profile
        .admin_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "admin_url".into(),
            reason: format!("invalid URL '{}': {e}", profile.admin_url),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    let mut config = GatewayConfig::new(url).with_tls(tls).with_timeout(timeout);
    if let Some(token) = resolve_secret(profile, profile_name, SecretKind::AdminToken) {
        config = config.with_admin_token(token);
    }
    Ok(config)
}
