//! Signed download link commands. These never touch the Admin API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use kongly_core::{SecureLinkSigner, SignedLink};
use serde::Serialize;

use crate::cli::{GlobalOpts, LinkArgs, LinkCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct LinkView {
    url: String,
    path: String,
    token: String,
    expires_at: i64,
}

impl LinkView {
    fn new(link: &SignedLink, base: Option<&str>) -> Self {
        Self {
            url: base.map_or_else(|| link.url(), |b| link.url_on(b)),
            path: link.path.clone(),
            token: link.token.clone(),
            expires_at: link.expires_at,
        }
    }
}

fn detail(v: &LinkView) -> String {
    let expires = DateTime::<Utc>::from_timestamp(v.expires_at, 0)
        .map_or_else(|| v.expires_at.to_string(), |t| t.to_rfc3339());
    [
        format!("URL:      {}", v.url),
        format!("Path:     {}", v.path),
        format!("Token:    {}", v.token),
        format!("Expires:  {expires}"),
    ]
    .join("\n")
}

pub fn handle(args: LinkArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LinkCommand::Sign {
            path,
            expires,
            ttl,
            base,
            secret,
        } => {
            if !path.starts_with('/') {
                return Err(CliError::Validation {
                    field: "path".into(),
                    reason: format!("'{path}' must start with '/'"),
                });
            }
            let signer = SecureLinkSigner::new(config::resolve_link_secret(
                secret.secret.as_deref(),
                global,
            )?);
            let link = match expires {
                Some(at) => signer.sign(&path, at),
                None => signer.sign_for(&path, Duration::from_secs(ttl)),
            };
            let base = base.or_else(|| config::profile_link_base(global));
            tracing::debug!(path = %link.path, expires_at = link.expires_at, "signed link");

            let view = LinkView::new(&link, base.as_deref());
            let out = output::render_single(global.output, &view, detail, |v| v.url.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LinkCommand::Verify { url, now, secret } => {
            let signer = SecureLinkSigner::new(config::resolve_link_secret(
                secret.secret.as_deref(),
                global,
            )?);
            let link = match now {
                Some(now) => signer.verify(&url, now)?,
                None => signer.verify_now(&url)?,
            };
            if !global.quiet {
                eprintln!("Link valid");
            }
            let view = LinkView::new(&link, None);
            let out = output::render_single(global.output, &view, detail, |v| v.path.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
