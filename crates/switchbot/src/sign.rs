//! Request signing for the SwitchBot v1.1 API.
//!
//! Every request carries `Authorization`, `t`, `nonce` and `sign` headers,
//! where `sign` is the upper-cased base64 HMAC-SHA256 of `token + t + nonce`
//! keyed by the account secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header values for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub sign: String,
    pub nonce: String,
    pub timestamp: String,
}

/// Sign a request with a fresh nonce and the current time.
///
/// # Errors
///
/// Returns [`Error::InvalidCredentials`] only if the HMAC rejects the key,
/// which HMAC-SHA256 does not do for any key length.
pub fn sign_now(token: &str, secret: &str) -> Result<SignedHeaders> {
    let nonce = Uuid::new_v4().to_string();
    let timestamp = chrono::Utc::now().timestamp_millis();
    sign(token, secret, timestamp, &nonce)
}

/// Sign a request for a given timestamp (Unix milliseconds) and nonce.
///
/// # Errors
///
/// Returns [`Error::InvalidCredentials`] only if the HMAC rejects the key,
/// which HMAC-SHA256 does not do for any key length.
pub fn sign(token: &str, secret: &str, timestamp: i64, nonce: &str) -> Result<SignedHeaders> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::invalid_credentials(e.to_string()))?;
    mac.update(format!("{token}{timestamp}{nonce}").as_bytes());
    let signature = STANDARD
        .encode(mac.finalize().into_bytes())
        .to_uppercase();

    Ok(SignedHeaders {
        authorization: token.to_string(),
        sign: signature,
        nonce: nonce.to_string(),
        timestamp: timestamp.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "test-token";
    const SECRET: &str = "test-secret";
    const T: i64 = 1_700_000_000_000;
    const NONCE: &str = "0b7a1f3e-2c4d-4e5f-8a9b-1c2d3e4f5a6b";

    #[test]
    fn test_sign_known_answer() {
        let headers = sign(TOKEN, SECRET, T, NONCE).ok();
        assert_eq!(
            headers,
            Some(SignedHeaders {
                authorization: TOKEN.to_string(),
                sign: "8VIIQKHUAQJHDS3+HDWHNQOOLKSSZWT2OB/B5NCDFKW=".to_string(),
                nonce: NONCE.to_string(),
                timestamp: "1700000000000".to_string(),
            })
        );
    }

    #[test]
    fn test_sign_covers_token_then_time_then_nonce() {
        // Same inputs concatenated as token + nonce + t.
        let swapped = "KJHW2NCXGIFFLWTJPF1Y7CY8O8+RPGUJZKQO5XBVX90=";
        let headers = sign(TOKEN, SECRET, T, NONCE).ok().map(|h| h.sign);
        assert_ne!(headers.as_deref(), Some(swapped));
    }

    #[test]
    fn test_sign_is_deterministic_for_fixed_inputs() {
        let first = sign("token", "secret", 1_700_000_000_000, "nonce-1");
        let second = sign("token", "secret", 1_700_000_000_000, "nonce-1");
        assert!(first.is_ok());
        assert_eq!(first.ok(), second.ok());
    }

    #[test]
    fn test_signature_shape() {
        let headers = sign("token", "secret", 1_700_000_000_000, "nonce-1");
        let headers = headers.ok();
        let sign = headers.as_ref().map(|h| h.sign.clone()).unwrap_or_default();

        // 32-byte digest -> 44 base64 characters.
        assert_eq!(sign.len(), 44);
        assert_eq!(sign, sign.to_uppercase());
        assert_eq!(
            headers.map(|h| (h.authorization, h.timestamp)),
            Some(("token".to_string(), "1700000000000".to_string()))
        );
    }

    #[test]
    fn test_signature_depends_on_nonce_and_secret() {
        let base = sign("token", "secret", 1, "a").ok().map(|h| h.sign);
        let other_nonce = sign("token", "secret", 1, "b").ok().map(|h| h.sign);
        let other_secret = sign("token", "other", 1, "a").ok().map(|h| h.sign);
        assert_ne!(base, other_nonce);
        assert_ne!(base, other_secret);
    }

    #[test]
    fn test_sign_now_uses_fresh_nonce() {
        let a = sign_now("token", "secret").ok().map(|h| h.nonce);
        let b = sign_now("token", "secret").ok().map(|h| h.nonce);
        assert!(a.is_some());
        assert_ne!(a, b);
    }
}
