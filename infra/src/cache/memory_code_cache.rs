//! In-process verification code store
//!
//! Same issue/verify contract as [`super::RedisCodeStore`] for single
//! instance deployments and tests. The whole check-and-mutate sequence runs
//! under one mutex, which gives the same atomicity as the Redis scripts
//! within this process only.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use cg_core::domain::entities::verification_code::{code_key, CodeRecord, VerifyOutcome};
use cg_core::errors::CodeError;
use cg_core::services::verification::CodeStore;
use cg_shared::config::VerificationConfig;

struct Entry {
    record: CodeRecord,
    expires_at: Instant,
}

/// Bounded map of live code records
pub struct MemoryCodeStore {
    entries: Mutex<HashMap<String, Entry>>,
    capacity: usize,
    max_attempts: i64,
    expiry: Duration,
    reissue_threshold: Duration,
}

impl MemoryCodeStore {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: config.memory_capacity.max(1),
            max_attempts: config.max_attempts,
            expiry: Duration::from_secs(config.expiry_seconds),
            reissue_threshold: Duration::from_secs(config.reissue_threshold_seconds()),
        }
    }

    /// Number of records currently held, expired ones included
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, CodeError> {
        self.entries
            .lock()
            .map_err(|_| CodeError::system("code store lock poisoned"))
    }

    // Drop expired entries, then the soonest-expiring ones, until `key` fits.
    fn make_room(&self, entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries.contains_key(key) || entries.len() < self.capacity {
            return;
        }
        entries.retain(|_, entry| entry.expires_at > now);

        while entries.len() >= self.capacity {
            let victim = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone());
            match victim {
                Some(k) => {
                    tracing::debug!(key = %k, "Evicting verification code to respect capacity");
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn store(&self, scope: &str, recipient: &str, code: &str) -> Result<(), CodeError> {
        let key = code_key(scope, recipient);
        let now = Instant::now();
        let mut entries = self.lock()?;

        if let Some(entry) = entries.get(&key) {
            if entry.expires_at > now && entry.expires_at - now > self.reissue_threshold {
                return Err(CodeError::SendTooFrequent);
            }
        }

        self.make_room(&mut entries, &key, now);
        entries.insert(
            key,
            Entry {
                record: CodeRecord::with_attempts(code, self.max_attempts),
                expires_at: now + self.expiry,
            },
        );
        Ok(())
    }

    async fn verify(
        &self,
        scope: &str,
        recipient: &str,
        input: &str,
    ) -> Result<VerifyOutcome, CodeError> {
        let key = code_key(scope, recipient);
        let now = Instant::now();
        let mut entries = self.lock()?;

        let expired = match entries.get(&key) {
            Some(entry) => entry.expires_at <= now,
            None => return Err(CodeError::NotFound),
        };
        if expired {
            entries.remove(&key);
            return Err(CodeError::NotFound);
        }

        let outcome = match entries.get_mut(&key) {
            Some(entry) => entry.record.try_verify(input)?,
            None => return Err(CodeError::NotFound),
        };
        if outcome.is_matched() {
            entries.remove(&key);
        }
        Ok(outcome)
    }
}
