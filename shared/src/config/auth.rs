//! Session credential configuration

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_ACCESS_SECRET: &str = "access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "refresh-secret-change-in-production";

/// Signing configuration for the access/refresh credential pair
///
/// Access and refresh credentials are signed with distinct secrets so that
/// leaking one secret never allows forging the other credential type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign access credentials
    pub access_secret: String,

    /// Secret used to sign refresh credentials
    pub refresh_secret: String,

    /// Access credential lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh credential lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Remaining access lifetime (seconds) below which the credential is renewed
    #[serde(default = "default_renew_window")]
    pub renew_window: i64,

    /// Optional issuer claim
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 1800,    // 30 minutes
            refresh_token_expiry: 604800, // 7 days
            renew_window: default_renew_window(),
            issuer: None,
        }
    }
}

impl JwtConfig {
    /// Create a new configuration with the two signing secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_secret: std::env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.access_secret),
            refresh_secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            renew_window: env_or("JWT_RENEW_WINDOW", defaults.renew_window),
            issuer: std::env::var("JWT_ISSUER").ok(),
        }
    }

    /// Set access credential expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh credential expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if either secret is still the built-in default (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Check that the two secrets are actually distinct
    pub fn has_distinct_secrets(&self) -> bool {
        self.access_secret != self.refresh_secret
    }
}

fn default_renew_window() -> i64 {
    50
}
