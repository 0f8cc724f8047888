//! HMAC signatures on confirmation events.
//!
//! When a confirmation secret is configured the gateway signs the raw request body and
//! sends `X-Confirmation-Signature: sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Confirmation-Signature";

/// Generate the HMAC-SHA256 signature header value for `body`.
///
/// # Format
///
/// `sha256=<hex_encoded_hmac>`
pub fn generate_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature header value against `body` in constant time.
pub fn verify_signature(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), AppError> {
    let signature = header
        .and_then(|h| h.strip_prefix("sha256="))
        .and_then(|h| hex::decode(h).ok())
        .ok_or(AppError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(body);
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_signature_verifies() {
        let body = br#"{"author_id":"1","content":"x"}"#;
        let header = generate_signature("secret", body);

        assert!(header.starts_with("sha256="));
        assert!(verify_signature("secret", body, Some(&header)).is_ok());
    }

    #[test]
    fn rejects_tampered_body_and_wrong_secret() {
        let header = generate_signature("secret", b"original");

        assert!(verify_signature("secret", b"tampered", Some(&header)).is_err());
        assert!(verify_signature("other", b"original", Some(&header)).is_err());
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(verify_signature("secret", b"body", None).is_err());
        assert!(verify_signature("secret", b"body", Some("md5=abcd")).is_err());
        assert!(verify_signature("secret", b"body", Some("sha256=not-hex")).is_err());
    }
}
