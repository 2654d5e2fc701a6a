//! Session secret generation and CSRF token signing.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use fx_types::SessionId;

type HmacSha256 = Hmac<Sha256>;

/// Generates a random 32-byte secret, hex encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Short fingerprint of a secret, safe to log.
pub fn secret_fingerprint(secret: &str) -> String {
    let hash = Sha256::digest(secret.as_bytes());
    hex::encode(&hash[..4])
}

/// Derives the CSRF token for `intent` within a session.
///
/// The token is HMAC-SHA256 over the session id followed by the intent, so it
/// is stable for the life of the session and useless in any other one.
pub fn csrf_token(secret: &str, session: &SessionId, intent: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(session.to_string().as_bytes());
    mac.update(intent.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a submitted CSRF token using constant-time comparison.
pub fn verify_csrf_token(secret: &str, session: &SessionId, intent: &str, token: &str) -> bool {
    let expected = csrf_token(secret, session, intent);
    expected.as_bytes().ct_eq(token.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let fp = secret_fingerprint("s3cret");
        assert_eq!(fp.len(), 8);
        assert_eq!(fp, secret_fingerprint("s3cret"));
    }

    #[test]
    fn test_csrf_token_verification() {
        let session = SessionId::new();
        let token = csrf_token("secret", &session, "convert");

        assert_eq!(token.len(), 64);
        assert!(verify_csrf_token("secret", &session, "convert", &token));
        assert!(!verify_csrf_token("other", &session, "convert", &token));
        assert!(!verify_csrf_token("secret", &session, "login", &token));
        assert!(!verify_csrf_token("secret", &SessionId::new(), "convert", &token));
        assert!(!verify_csrf_token("secret", &session, "convert", ""));
    }
}
