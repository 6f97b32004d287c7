//! `X-Line-Signature` verification.
//!
//! The platform signs every webhook body with HMAC-SHA256 keyed by the
//! channel secret and sends the digest base64-encoded in the header.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn mac_for(channel_secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    mac
}

/// Signs a body and returns the base64 value the header would carry.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    STANDARD.encode(mac_for(channel_secret, body).finalize().into_bytes())
}

/// Verifies a header value against the body in constant time.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(decoded) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    mac_for(channel_secret, body).verify_slice(&decoded).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let secret = "channel_secret_123";
        let body = br#"{"destination":"U0","events":[]}"#;
        let sig = sign(secret, body);
        assert!(verify(secret, body, &sig));
        assert!(!verify("wrong_secret", body, &sig));
        assert!(!verify(secret, b"tampered", &sig));
    }

    #[test]
    fn known_digest() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let sig = sign("key", b"The quick brown fox jumps over the lazy dog");
        assert_eq!(sig, "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=");
    }

    #[test]
    fn rejects_non_base64_signature() {
        assert!(!verify("secret", b"body", "not base64 !!"));
        assert!(!verify("secret", b"body", ""));
    }
}
