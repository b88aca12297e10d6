//! Redis-backed session revocation sentinels

use async_trait::async_trait;
use std::sync::Arc;

use cg_core::domain::entities::session::session_revocation_key;
use cg_core::errors::DomainError;
use cg_core::repositories::SessionRepository;

use super::redis_client::RedisClient;

/// Stores `users:ssid:{session_id}` sentinels
pub struct RedisSessionRepository {
    client: Arc<RedisClient>,
}

impl RedisSessionRepository {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn mark_revoked(&self, session_id: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        let key = self.client.key(&session_revocation_key(session_id));
        self.client.set_with_expiry(&key, "", ttl_seconds).await?;
        Ok(())
    }

    async fn is_revoked(&self, session_id: &str) -> Result<bool, DomainError> {
        let key = self.client.key(&session_revocation_key(session_id));
        Ok(self.client.exists(&key).await?)
    }
}
