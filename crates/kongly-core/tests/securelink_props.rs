//! Property-based tests for signed links.
//!
//! Tokens are fixed-length URL-safe text, a link verifies with its own
//! inputs up to and including its expiry, and fails the right way after.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use kongly_core::LinkError;
use kongly_core::securelink::{sign, sign_link, verify};

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-]{1,12}(\\.[a-z0-9]{1,4})?", 1..5)
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

fn arb_secret() -> impl Strategy<Value = String> {
    "[ -~]{1,32}"
}

const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// `token` with the character at `index` replaced by a different one.
fn mutate(token: &str, index: usize, pick: usize) -> String {
    let mut bytes = token.as_bytes().to_vec();
    let original = bytes[index];
    let replacement = URL_SAFE
        .iter()
        .copied()
        .filter(|&b| b != original)
        .nth(pick % (URL_SAFE.len() - 1))
        .unwrap();
    bytes[index] = replacement;
    String::from_utf8(bytes).unwrap()
}

proptest! {
    #[test]
    fn token_is_22_url_safe_chars(secret in arb_secret(), path in arb_path(), expires in 0i64..4_000_000_000) {
        let token = sign(&secret, &path, expires);
        prop_assert_eq!(token.len(), 22);
        prop_assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn link_verifies_until_it_expires(
        secret in arb_secret(),
        path in arb_path(),
        expires in 1i64..4_000_000_000,
        before in 0i64..1_000_000,
    ) {
        let link = sign_link(&secret, &path, expires);
        let now = (expires - before).max(0);
        prop_assert_eq!(verify(&link.url(), &secret, now), Ok(link));
    }

    #[test]
    fn expired_link_reports_expiry(
        secret in arb_secret(),
        path in arb_path(),
        expires in 0i64..4_000_000_000,
        after in 1i64..1_000_000,
    ) {
        let link = sign_link(&secret, &path, expires);
        let now = expires + after;
        prop_assert_eq!(
            verify(&link.url(), "a different secret", now),
            Err(LinkError::Expired { expires_at: expires, now })
        );
    }

    #[test]
    fn other_secret_is_invalid(
        secret in arb_secret(),
        other in arb_secret(),
        path in arb_path(),
        expires in 1i64..4_000_000_000,
    ) {
        prop_assume!(secret != other);
        let link = sign_link(&secret, &path, expires);
        prop_assert_eq!(verify(&link.url(), &other, 0), Err(LinkError::InvalidSignature));
    }

    #[test]
    fn shifted_expiry_is_invalid(
        secret in arb_secret(),
        path in arb_path(),
        expires in 1i64..4_000_000_000,
    ) {
        let link = sign_link(&secret, &path, expires);
        let forged = format!("{}?st={}&e={}", link.path, link.token, expires + 1);
        prop_assert_eq!(verify(&forged, &secret, 0), Err(LinkError::InvalidSignature));
    }

    #[test]
    fn mutated_token_is_invalid(
        secret in arb_secret(),
        path in arb_path(),
        expires in 1i64..4_000_000_000,
        index in 0usize..22,
        pick in 0usize..64,
    ) {
        let link = sign_link(&secret, &path, expires);
        let token = mutate(&link.token, index, pick);
        let forged = format!("{}?st={token}&e={expires}", link.path);
        prop_assert_eq!(verify(&forged, &secret, 0), Err(LinkError::InvalidSignature));
    }
}

#[test]
fn fragment_in_token_is_malformed() {
    let link = sign_link("secret", "/f.tar.gz", 1_700_000_000);
    let forged = format!("{}?st=abc#{}&e={}", link.path, &link.token[4..], link.expires_at);
    assert!(matches!(
        verify(&forged, "secret", 0),
        Err(LinkError::Malformed { .. })
    ));
}
