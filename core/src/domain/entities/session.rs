//! Session credential claims and the issued credential pair.

use serde::{Deserialize, Serialize};

/// Key prefix of the revocation sentinel
pub const REVOKED_SESSION_KEY_PREFIX: &str = "users:ssid";

/// Shared store key marking `session_id` as revoked
pub fn session_revocation_key(session_id: &str) -> String {
    format!("{}:{}", REVOKED_SESSION_KEY_PREFIX, session_id)
}

/// Claims of the short-lived access credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub uid: i64,
    /// Session id shared with the refresh credential
    pub ssid: String,
    /// Fingerprint (user agent) of the client the session was issued to
    pub user_agent: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl AccessClaims {
    /// Seconds until expiry, negative once expired
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        self.exp - now
    }
}

/// Claims of the long-lived refresh credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub uid: i64,
    pub ssid: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Credentials issued at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: String,
    /// Access credential lifetime in seconds
    pub access_expires_in: i64,
    /// Refresh credential lifetime in seconds
    pub refresh_expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revocation_key() {
        assert_eq!(session_revocation_key("abc"), "users:ssid:abc");
    }

    #[test]
    fn test_remaining_seconds() {
        let claims = AccessClaims {
            uid: 1,
            ssid: "s".into(),
            user_agent: "ua".into(),
            iat: 100,
            exp: 160,
            iss: None,
        };
        assert_eq!(claims.remaining_seconds(110), 50);
        assert!(claims.remaining_seconds(200) < 0);
    }
}
