//! Keyed sliding-window limiter capability

use async_trait::async_trait;

use crate::errors::LimiterError;

/// Sliding-window limiter
#[async_trait]
pub trait Limiter: Send + Sync {
    /// Record a call against `key`
    ///
    /// Returns `Ok(true)` when the call is rejected because the trailing
    /// window already holds the configured number of calls. Rejected calls
    /// are not recorded.
    async fn limit(&self, key: &str) -> Result<bool, LimiterError>;
}
