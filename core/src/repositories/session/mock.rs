//! Mock implementation of SessionRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::DomainError;

use super::r#trait::SessionRepository;

/// Mock session repository for testing
pub struct MockSessionRepository {
    sentinels: Arc<RwLock<HashMap<String, u64>>>,
    should_fail: bool,
}

impl MockSessionRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            sentinels: Arc::new(RwLock::new(HashMap::new())),
            should_fail: false,
        }
    }

    /// Repository whose every call fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// TTL the sentinel was written with
    pub async fn sentinel_ttl(&self, session_id: &str) -> Option<u64> {
        self.sentinels.read().await.get(session_id).copied()
    }
}

impl Default for MockSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn mark_revoked(&self, session_id: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        if self.should_fail {
            return Err(DomainError::Internal {
                message: "mock repository down".to_string(),
            });
        }
        self.sentinels
            .write()
            .await
            .insert(session_id.to_string(), ttl_seconds);
        Ok(())
    }

    async fn is_revoked(&self, session_id: &str) -> Result<bool, DomainError> {
        if self.should_fail {
            return Err(DomainError::Internal {
                message: "mock repository down".to_string(),
            });
        }
        Ok(self.sentinels.read().await.contains_key(session_id))
    }
}
