//! Webhook body signatures (HMAC-SHA256, lowercase hex).

use alloy::primitives::hex;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header that carries the signature of a webhook body.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

fn keyed(secret: &[u8], body: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 takes keys of any length");
    mac.update(body);
    mac
}

pub fn sign_body(secret: &[u8], body: &[u8]) -> String {
    hex::encode(keyed(secret, body).finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_lowercase_hex_sha256() {
        let sig = sign_body(b"webhook-secret", b"{\"subject\":\"x\"}");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2.
        assert_eq!(
            sign_body(b"Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_secret_and_body_both_change_the_signature() {
        let sig = sign_body(b"secret-1", b"body");
        assert_ne!(sig, sign_body(b"secret-2", b"body"));
        assert_ne!(sig, sign_body(b"secret-1", b"tampered"));
        assert_eq!(sig, sign_body(b"secret-1", b"body"));
    }
}
