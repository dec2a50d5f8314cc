//! CLI configuration: thin wrapper around `kongly_config`.
//!
//! Re-exports the shared types and adds resolution that respects the
//! `GlobalOpts` flag overrides (--admin, --admin-token, --insecure, ...).

use std::time::Duration;

use secrecy::SecretString;

use kongly_core::{GatewayConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use kongly_config::{
    Config, Profile, SecretKind, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Build a `GatewayConfig` from the config file, active profile and flags.
///
/// A bare `--admin` URL works without any config file.
pub fn build_gateway_config(global: &GlobalOpts) -> Result<GatewayConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    match cfg.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, &cfg, global),
        None if global.profile.is_some() => Err(kongly_config::ConfigError::UnknownProfile {
            name: profile_name,
        }
        .into()),
        None => {
            let url_str = global.admin.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let tls = if global.insecure || cfg.defaults.insecure {
                TlsVerification::DangerAcceptInvalid
            } else {
                TlsVerification::SystemDefaults
            };
            let timeout = global.timeout.unwrap_or(cfg.defaults.timeout);

            let mut config = GatewayConfig::new(parse_admin_url(url_str)?)
                .with_tls(tls)
                .with_timeout(Duration::from_secs(timeout));
            if let Some(ref token) = global.admin_token {
                config = config.with_admin_token(SecretString::from(token.clone()));
            }
            Ok(config)
        }
    }
}

/// Translate a `Profile` + global flags into a `GatewayConfig`.
///
/// CLI flag overrides take priority over profile values.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<GatewayConfig, CliError> {
    let mut config = kongly_config::profile_to_gateway_config(profile, profile_name, &cfg.defaults)?;

    if let Some(ref url_str) = global.admin {
        config.admin_url = parse_admin_url(url_str)?;
    }
    if let Some(ref token) = global.admin_token {
        config = config.with_admin_token(SecretString::from(token.clone()));
    }
    if global.insecure {
        config = config.with_tls(TlsVerification::DangerAcceptInvalid);
    }
    if let Some(secs) = global.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn parse_admin_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "admin".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// The signing secret for `link` commands: the flag, else the profile's.
pub fn resolve_link_secret(
    flag: Option<&str>,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(secret) = flag {
        return Ok(SecretString::from(secret.to_owned()));
    }
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let Some(profile) = cfg.profiles.get(&profile_name) else {
        return Err(CliError::MissingSecret {
            what: SecretKind::LinkSecret.to_string(),
        });
    };
    Ok(kongly_config::require_secret(
        profile,
        &profile_name,
        SecretKind::LinkSecret,
    )?)
}

/// `link_base` of the active profile, if one is configured.
pub fn profile_link_base(global: &GlobalOpts) -> Option<String> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    cfg.profiles
        .get(&profile_name)
        .and_then(|p| p.link_base.clone())
}
