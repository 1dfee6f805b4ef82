//! Client-side reading of the token's claims.
//!
//! The API issues HS256 JWTs carrying `user_id`, `exp`, `iat` and `nbf`. Only
//! `exp` is read here. The portal cannot verify the signature (it does not hold the key) and does not
//! need to: the claims are only read to notice that a token has expired so
//! the browser is logged out instead of sending a dead token. Tokens that are
//! not JWTs are treated as opaque and never expire client-side.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The claims the portal cares about. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry as a Unix timestamp.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying it.
    ///
    /// Returns `None` for anything that is not a three-segment token with a
    /// base64url JSON payload.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let mut segments = token.trim().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return None;
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// When the token stops being valid, if it says.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }
}

/// Whether `token` is a JWT that expired at or before `now`.
#[must_use]
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    TokenClaims::decode(token).is_some_and(|claims| claims.is_expired_at(now))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    /// Build an unsigned JWT with the given payload.
    fn jwt(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decode_reads_expiry() {
        let token = jwt(&json!({"user_id": "u1", "exp": 1_900_000_000, "iat": 1_800_000_000}));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert_eq!(
            claims.expires_at(),
            DateTime::from_timestamp(1_900_000_000, 0)
        );
    }

    #[test]
    fn test_decode_rejects_non_jwt() {
        assert!(TokenClaims::decode("opaque-session-token").is_none());
        assert!(TokenClaims::decode("a.b").is_none());
        assert!(TokenClaims::decode("a.b.c.d").is_none());
        assert!(TokenClaims::decode("a.!!!.c").is_none());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let past = jwt(&json!({"exp": (now - Duration::minutes(1)).timestamp()}));
        let future = jwt(&json!({"exp": (now + Duration::hours(24)).timestamp()}));
        let no_exp = jwt(&json!({"user_id": "u1"}));

        assert!(is_expired(&past, now));
        assert!(!is_expired(&future, now));
        assert!(!is_expired(&no_exp, now));
        assert!(!is_expired("opaque-token", now));
    }
}
