//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Access/refresh credential signing and lifetimes
//! - `cache` - Redis connection configuration
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Sliding-window limits for outbound channels
//! - `sms` - Message providers, failover strategy and retry policy
//! - `verification` - Verification code policy

pub mod auth;
pub mod cache;
pub mod environment;
pub mod rate_limit;
pub mod sms;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use sms::{FailoverStrategy, ProviderConfig, ProviderKind, RetryConfig, SmsConfig};
pub use verification::{StoreBackend, VerificationConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Verification code policy
    pub verification: VerificationConfig,

    /// Credential signing configuration
    pub jwt: JwtConfig,

    /// Message dispatch configuration
    pub sms: SmsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            jwt: JwtConfig::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// A `.env` file in the working directory is honoured when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            cache: CacheConfig::from_env(),
            verification: VerificationConfig::from_env(),
            jwt: JwtConfig::from_env(),
            sms: SmsConfig::from_env(),
            logging,
        }
    }
}

/// Read and parse an environment variable, falling back to `default`
/// when it is unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
