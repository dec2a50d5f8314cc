//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretName};
use crate::config::{self, Config, Profile, SecretKind};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext secrets masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.admin_token.is_some() {
            profile.admin_token = Some(MASK.into());
        }
        if profile.link_secret.is_some() {
            profile.link_secret = Some(MASK.into());
        }
    }
    cfg
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unrenderable config: {e}"))
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Ask for an optional secret and where to keep it.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if it was
/// stored in the keyring or left empty.
fn prompt_secret(profile_name: &str, kind: SecretKind) -> Result<Option<String>, CliError> {
    let secret = rpassword::prompt_password(format!("{kind} (empty to skip): ")).map_err(prompt_err)?;
    if secret.is_empty() {
        return Ok(None);
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {kind}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        kongly_config::store_secret(profile_name, kind, &secret)?;
        eprintln!("   ✓ {kind} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(global.output, &cfg, format_config, |c| {
                c.profiles.keys().cloned().collect::<Vec<_>>().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("kongly configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(config::active_profile_name(global, &cfg))
                .interact_text()
                .map_err(prompt_err)?;

            let admin_url: String = Input::new()
                .with_prompt("Admin API URL")
                .default("http://127.0.0.1:8001".into())
                .interact_text()
                .map_err(prompt_err)?;
            if admin_url.parse::<url::Url>().is_err() {
                return Err(CliError::Validation {
                    field: "admin_url".into(),
                    reason: format!("invalid URL: {admin_url}"),
                });
            }

            let link_base: String = Input::new()
                .with_prompt("Download host for signed links (empty to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(admin_url);
            profile.link_base = Some(link_base).filter(|s| !s.is_empty());
            profile.admin_token = prompt_secret(&profile_name, SecretKind::AdminToken)?;
            profile.link_secret = prompt_secret(&profile_name, SecretKind::LinkSecret)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Test it: kongly plugins enabled");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: kongly config init");
            } else {
                let lines: Vec<_> = cfg
                    .profiles
                    .keys()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetSecret { name } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let kind = match name {
                SecretName::AdminToken => SecretKind::AdminToken,
                SecretName::LinkSecret => SecretKind::LinkSecret,
            };
            let secret = rpassword::prompt_password(format!("{kind}: ")).map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: kind.key().into(),
                    reason: "value cannot be empty".into(),
                });
            }
            kongly_config::store_secret(&profile_name, kind, &secret)?;
            eprintln!("✓ {kind} stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
