//! In-process sliding window
//!
//! Keeps the accepted timestamps per key in a deque. Only correct within a
//! single process.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use cg_core::errors::LimiterError;
use cg_core::services::rate_limit::Limiter;
use cg_shared::config::RateLimitConfig;

pub struct MemorySlidingWindowLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    window: Duration,
    threshold: usize,
}

impl MemorySlidingWindowLimiter {
    pub fn new(window: Duration, threshold: u32) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window,
            threshold: threshold as usize,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(Duration::from_millis(config.window_ms), config.threshold)
    }
}

#[async_trait]
impl Limiter for MemorySlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<bool, LimiterError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().map_err(|_| LimiterError::Unavailable {
            message: "limiter lock poisoned".to_string(),
        })?;

        let calls = windows.entry(key.to_string()).or_default();
        while let Some(oldest) = calls.front() {
            if now.duration_since(*oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }

        if calls.len() >= self.threshold {
            return Ok(true);
        }
        calls.push_back(now);
        Ok(false)
    }
}
