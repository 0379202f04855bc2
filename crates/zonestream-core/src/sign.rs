//! Delivery request signing.
//!
//! Requests to a keyed delivery endpoint carry two headers: `timestamp` (unix
//! seconds) and `signature`, where
//!
//! ```text
//! signature = hex(HMAC-SHA256(key, "timestamp=<timestamp>"))
//! ```
//!
//! The delivery side treats timestamps as single-use freshness proofs, so the
//! signature is recomputed for every outgoing request. This module only
//! produces signatures; validation happens on the server.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authentication material for exactly one outgoing delivery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAuth {
    /// Unix seconds at signing time.
    pub timestamp: u64,
    /// Lowercase hex HMAC-SHA256 over `"timestamp=<timestamp>"`.
    pub signature: String,
}

impl RequestAuth {
    /// The two wire headers, in the order the delivery server documents them.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("signature".to_string(), self.signature.clone()),
            ("timestamp".to_string(), self.timestamp.to_string()),
        ]
    }
}

/// Sign a delivery request with `key` at the given instant.
///
/// Callers pass the current time at the call site (`SystemTime::now()`), never
/// a cached instant; a stale timestamp is rejected by the delivery server.
pub fn sign_request(key: &str, now: SystemTime) -> RequestAuth {
    let timestamp = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    sign_request_at(key, timestamp)
}

/// Deterministic form of [`sign_request`] for a fixed timestamp.
pub fn sign_request_at(key: &str, timestamp: u64) -> RequestAuth {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("timestamp={}", timestamp).as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    RequestAuth {
        timestamp,
        signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn signature_is_deterministic_for_fixed_inputs() {
        let a = sign_request_at("secret", 1_700_000_000);
        let b = sign_request_at("secret", 1_700_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn signature_is_lowercase_hex_of_sha256_width() {
        let auth = sign_request_at("secret", 1_700_000_000);
        assert_eq!(auth.signature.len(), 64);
        assert!(auth
            .signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn changing_key_changes_signature() {
        let a = sign_request_at("key-one", 1_700_000_000);
        let b = sign_request_at("key-two", 1_700_000_000);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn changing_timestamp_changes_signature() {
        let a = sign_request_at("secret", 1_700_000_000);
        let b = sign_request_at("secret", 1_700_000_001);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn sign_request_uses_wall_clock_seconds() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_123);
        let auth = sign_request("secret", now);
        assert_eq!(auth.timestamp, 1_700_000_123);
        assert_eq!(auth, sign_request_at("secret", 1_700_000_123));
    }

    #[test]
    fn headers_expose_signature_and_timestamp() {
        let auth = sign_request_at("secret", 1_700_000_000);
        let headers = auth.headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, "signature");
        assert_eq!(headers[0].1, auth.signature);
        assert_eq!(headers[1].0, "timestamp");
        assert_eq!(headers[1].1, "1700000000");
    }
}
