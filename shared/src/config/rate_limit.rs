//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Sliding-window limit for one outbound channel
///
/// At most `threshold` calls are accepted within any trailing window of
/// `window_ms` milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Window length in milliseconds
    pub window_ms: u64,

    /// Maximum accepted calls per window
    pub threshold: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_ms: 1000,
            threshold: 100,
        }
    }
}

impl RateLimitConfig {
    /// Create a limit of `threshold` calls per `window_ms`
    pub fn new(window_ms: u64, threshold: u32) -> Self {
        Self {
            enabled: true,
            window_ms,
            threshold,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("SMS_RATE_LIMIT_ENABLED", defaults.enabled),
            window_ms: env_or("SMS_RATE_LIMIT_WINDOW_MS", defaults.window_ms),
            threshold: env_or("SMS_RATE_LIMIT_THRESHOLD", defaults.threshold),
        }
    }

    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

fn default_enabled() -> bool {
    true
}
