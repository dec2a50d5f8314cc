// ── Signed download links ──
//
// Tokens compatible with nginx `secure_link`: the token is
// `md5(secret ++ path ++ expires)` rendered as URL-safe base64 without
// padding, and the link carries it as `?st=<token>&e=<expires>`.
// Everything here is a pure function of its inputs.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use md5::{Digest, Md5};
use percent_encoding::percent_decode_str;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Query parameter carrying the token.
pub const TOKEN_PARAM: &str = "st";
/// Query parameter carrying the expiry (unix seconds).
pub const EXPIRES_PARAM: &str = "e";

/// Why a link was refused. The three cases are never folded together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("link expired at {expires_at} (now {now})")]
    Expired { expires_at: i64, now: i64 },

    #[error("link signature does not match")]
    InvalidSignature,

    #[error("malformed link: {reason}")]
    Malformed { reason: String },
}

impl LinkError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Token for `path` valid until `expires_at` (unix seconds).
pub fn sign(secret: &str, path: &str, expires_at: i64) -> String {
    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    hasher.update(path.as_bytes());
    hasher.update(expires_at.to_string().as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Build the full signed link for `path`.
pub fn sign_link(secret: &str, path: &str, expires_at: i64) -> SignedLink {
    SignedLink {
        token: sign(secret, path, expires_at),
        path: path.to_owned(),
        expires_at,
    }
}

/// Check a signed link against `secret` at time `now` (unix seconds).
///
/// `url` may be absolute (`https://dl.example.com/f.tar.gz?st=..&e=..`) or
/// just the path and query. Expiry is checked before the signature, so a
/// stale link reports `Expired` even if it was also tampered with.
///
/// The path is checked in its normalized form: dot segments are resolved,
/// so a link signed for `/a/../f.tar.gz` is compared as `/f.tar.gz`. A
/// token mangled so the query no longer parses (a `#`, say) is `Malformed`
/// rather than `InvalidSignature`.
pub fn verify(url: &str, secret: &str, now: i64) -> Result<SignedLink, LinkError> {
    let link = SignedLink::parse(url)?;
    if now > link.expires_at {
        return Err(LinkError::Expired {
            expires_at: link.expires_at,
            now,
        });
    }
    if sign(secret, &link.path, link.expires_at) != link.token {
        return Err(LinkError::InvalidSignature);
    }
    Ok(link)
}

/// A path together with its token and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLink {
    pub path: String,
    pub token: String,
    pub expires_at: i64,
}

impl SignedLink {
    /// `path?st=<token>&e=<expires>`
    pub fn url(&self) -> String {
        format!(
            "{}?{TOKEN_PARAM}={}&{EXPIRES_PARAM}={}",
            self.path, self.token, self.expires_at
        )
    }

    /// The link prefixed with a download host, e.g. `https://dl.example.com`.
    pub fn url_on(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.url())
    }

    /// Split a link into path, token and expiry without checking anything.
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
                .and_then(|base| base.join(raw))
                .map_err(|e| LinkError::malformed(e.to_string()))?,
            Err(e) => return Err(LinkError::malformed(e.to_string())),
        };

        let mut token = None;
        let mut expires = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                TOKEN_PARAM if token.is_none() => token = Some(value.into_owned()),
                EXPIRES_PARAM if expires.is_none() => expires = Some(value.into_owned()),
                _ => {}
            }
        }

        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LinkError::malformed(format!("missing '{TOKEN_PARAM}' parameter")))?;
        let expires = expires
            .ok_or_else(|| LinkError::malformed(format!("missing '{EXPIRES_PARAM}' parameter")))?;
        let expires_at = expires.parse::<i64>().map_err(|_| {
            LinkError::malformed(format!("'{EXPIRES_PARAM}' is not a unix timestamp: {expires}"))
        })?;

        let path = percent_decode_str(url.path())
            .decode_utf8_lossy()
            .into_owned();

        Ok(Self {
            path,
            token,
            expires_at,
        })
    }
}

impl fmt::Display for SignedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Signs and verifies links with one secret.
#[derive(Debug, Clone)]
pub struct SecureLinkSigner {
    secret: SecretString,
}

impl SecureLinkSigner {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    pub fn sign(&self, path: &str, expires_at: i64) -> SignedLink {
        sign_link(self.secret.expose_secret(), path, expires_at)
    }

    /// Sign `path` so it stays valid for `ttl` from now.
    pub fn sign_for(&self, path: &str, ttl: Duration) -> SignedLink {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.sign(path, Utc::now().timestamp().saturating_add(ttl))
    }

    pub fn verify(&self, url: &str, now: i64) -> Result<SignedLink, LinkError> {
        verify(url, self.secret.expose_secret(), now)
    }

    /// [`verify`](Self::verify) against the wall clock.
    pub fn verify_now(&self, url: &str) -> Result<SignedLink, LinkError> {
        self.verify(url, Utc::now().timestamp())
    }
}
