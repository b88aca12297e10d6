//! # Infrastructure Layer
//!
//! Concrete implementations of the capability traits defined in `cg_core`:
//!
//! - **Cache**: Redis client, the atomic verification code store, the
//!   session revocation repository and an in-process code store
//! - **Rate limiting**: sliding-window limiters backed by Redis or process memory
//! - **SMS**: message providers and the dispatch policies that wrap them
//!   (rate limit, failover, retry, template authorization)

use cg_core::errors::{CodeError, DomainError};

/// Cache module - Redis client and stores
pub mod cache;

/// Sliding-window rate limiters
pub mod ratelimit;

/// SMS providers and dispatch chain
pub mod sms;

pub use cache::{MemoryCodeStore, RedisClient, RedisCodeStore, RedisSessionRepository};
pub use ratelimit::{MemorySlidingWindowLimiter, RedisSlidingWindowLimiter};
pub use sms::build_sms_sender;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A store script answered with a value outside its contract
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<InfrastructureError> for CodeError {
    fn from(err: InfrastructureError) -> Self {
        CodeError::system(err.to_string())
    }
}
