//! Shared utilities and common types for the Codegate workspace
//!
//! This crate provides functionality used by both the core and infra crates:
//! - Configuration types loaded from the environment
//! - Logging bootstrap (`tracing-subscriber`)
//! - Utility functions (phone validation and masking)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, FailoverStrategy, JwtConfig, LoggingConfig,
    ProviderConfig, RateLimitConfig, RetryConfig, SmsConfig, StoreBackend, VerificationConfig,
};
pub use config::environment::init_tracing;
pub use utils::phone;
