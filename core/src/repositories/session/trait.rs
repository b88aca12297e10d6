//! Session revocation repository trait.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Storage for session revocation sentinels
///
/// A session is revoked when a sentinel exists for its id, whatever the
/// stored value. Sentinels expire on their own once every credential that
/// could reference the session has expired.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Write the sentinel for `session_id` with a lifetime of `ttl_seconds`
    ///
    /// # Returns
    /// * `Ok(())` - The session is revoked
    /// * `Err(DomainError)` - The store could not be written
    async fn mark_revoked(&self, session_id: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Check whether a sentinel exists for `session_id`
    ///
    /// # Returns
    /// * `Ok(true)` - The session has been revoked
    /// * `Ok(false)` - No sentinel
    /// * `Err(DomainError)` - The store could not be read
    async fn is_revoked(&self, session_id: &str) -> Result<bool, DomainError>;
}
