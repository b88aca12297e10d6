//! Redis sorted-set sliding window
//!
//! Every accepted call is a member of `ZSET key` scored by its timestamp in
//! milliseconds. Trimming, counting and recording happen in one script so
//! concurrent callers on any instance share one exact window. Timestamps come
//! from the Redis server clock, so skew between instances cannot shift it.

use async_trait::async_trait;
use redis::Script;
use std::sync::Arc;
use uuid::Uuid;

use cg_core::errors::LimiterError;
use cg_core::services::rate_limit::Limiter;
use cg_shared::config::RateLimitConfig;

use crate::cache::RedisClient;

// KEYS[1] window key
// ARGV: window ms, threshold, member
// Returns 1 rejected, 0 accepted
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local window = tonumber(ARGV[1])
local threshold = tonumber(ARGV[2])
local time = redis.call("TIME")
local now = tonumber(time[1]) * 1000 + math.floor(tonumber(time[2]) / 1000)
redis.call("zremrangebyscore", key, "-inf", now - window)
local count = redis.call("zcount", key, "-inf", "+inf")
if count >= threshold then
    return 1
end
redis.call("zadd", key, now, ARGV[3])
redis.call("pexpire", key, window)
return 0
"#;

/// Distributed limiter shared by every instance talking to the same Redis
pub struct RedisSlidingWindowLimiter {
    client: Arc<RedisClient>,
    script: Script,
    window_ms: u64,
    threshold: u32,
}

impl RedisSlidingWindowLimiter {
    pub fn new(client: Arc<RedisClient>, window_ms: u64, threshold: u32) -> Self {
        Self {
            client,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            window_ms,
            threshold,
        }
    }

    pub fn from_config(client: Arc<RedisClient>, config: &RateLimitConfig) -> Self {
        Self::new(client, config.window_ms, config.threshold)
    }
}

#[async_trait]
impl Limiter for RedisSlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<bool, LimiterError> {
        let reply: i64 = self
            .client
            .eval_script(
                &self.script,
                &[self.client.key(key)],
                &[
                    self.window_ms.to_string(),
                    self.threshold.to_string(),
                    Uuid::new_v4().to_string(),
                ],
            )
            .await
            .map_err(|e| LimiterError::Unavailable {
                message: e.to_string(),
            })?;

        Ok(reply == 1)
    }
}
