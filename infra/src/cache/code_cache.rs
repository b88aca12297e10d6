//! Redis-backed atomic verification code store
//!
//! Each (scope, recipient) pair owns one hash at `phone_code:{scope}:{recipient}`
//! with the fields `code` and `attempts`. Issue and verify each run as a
//! single Lua script, so a check and its mutation are never interleaved with
//! another caller.

use async_trait::async_trait;
use redis::Script;
use std::sync::Arc;

use cg_core::domain::entities::verification_code::{code_key, VerifyOutcome};
use cg_core::errors::CodeError;
use cg_core::services::verification::CodeStore;
use cg_shared::config::VerificationConfig;
use cg_shared::utils::phone::mask_phone_number;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

// KEYS[1] record key
// ARGV: code, attempts, expiry seconds, reissue threshold seconds
// Returns 0 stored, -1 too frequent, -2 record without expiry
const ISSUE_SCRIPT: &str = r#"
local key = KEYS[1]
local ttl = tonumber(redis.call("ttl", key))
if ttl == -1 then
    return -2
elseif ttl == -2 or ttl <= tonumber(ARGV[4]) then
    redis.call("del", key)
    redis.call("hset", key, "code", ARGV[1], "attempts", ARGV[2])
    redis.call("expire", key, ARGV[3])
    return 0
else
    return -1
end
"#;

// KEYS[1] record key
// ARGV: submitted code
// Returns 0 matched, -1 attempts exhausted, -2 mismatch, -3 missing, -4 malformed
const VERIFY_SCRIPT: &str = r#"
local key = KEYS[1]
if redis.call("exists", key) == 0 then
    return -3
end
local attempts = tonumber(redis.call("hget", key, "attempts"))
if attempts == nil then
    return -4
end
if attempts <= 0 then
    return -1
end
redis.call("hincrby", key, "attempts", -1)
if redis.call("hget", key, "code") == ARGV[1] then
    redis.call("del", key)
    return 0
end
return -2
"#;

/// Verification code store on the shared Redis instance
pub struct RedisCodeStore {
    client: Arc<RedisClient>,
    issue_script: Script,
    verify_script: Script,
    max_attempts: i64,
    expiry_seconds: u64,
    reissue_threshold_seconds: u64,
}

impl RedisCodeStore {
    pub fn new(client: Arc<RedisClient>, config: &VerificationConfig) -> Self {
        Self {
            client,
            issue_script: Script::new(ISSUE_SCRIPT),
            verify_script: Script::new(VERIFY_SCRIPT),
            max_attempts: config.max_attempts,
            expiry_seconds: config.expiry_seconds,
            reissue_threshold_seconds: config.reissue_threshold_seconds(),
        }
    }

    fn key(&self, scope: &str, recipient: &str) -> String {
        self.client.key(&code_key(scope, recipient))
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn store(&self, scope: &str, recipient: &str, code: &str) -> Result<(), CodeError> {
        let key = self.key(scope, recipient);
        let reply: i64 = self
            .client
            .eval_script(
                &self.issue_script,
                &[key.clone()],
                &[
                    code.to_string(),
                    self.max_attempts.to_string(),
                    self.expiry_seconds.to_string(),
                    self.reissue_threshold_seconds.to_string(),
                ],
            )
            .await?;

        match reply {
            0 => Ok(()),
            -1 => Err(CodeError::SendTooFrequent),
            -2 => {
                tracing::error!(
                    scope = scope,
                    phone = %mask_phone_number(recipient),
                    operation = "issue",
                    "Verification code record exists without expiry"
                );
                Err(CodeError::system("verification code record has no expiry"))
            }
            other => Err(unexpected_reply("issue", &key, other)),
        }
    }

    async fn verify(
        &self,
        scope: &str,
        recipient: &str,
        input: &str,
    ) -> Result<VerifyOutcome, CodeError> {
        let key = self.key(scope, recipient);
        let reply: i64 = self
            .client
            .eval_script(&self.verify_script, &[key.clone()], &[input.to_string()])
            .await?;

        match reply {
            0 => Ok(VerifyOutcome::Matched),
            -1 => Err(CodeError::TooManyAttempts),
            -2 => Ok(VerifyOutcome::Mismatch),
            -3 => Err(CodeError::NotFound),
            other => Err(unexpected_reply("verify", &key, other)),
        }
    }
}

fn unexpected_reply(operation: &str, key: &str, reply: i64) -> CodeError {
    tracing::error!(key = key, operation = operation, reply, "Unexpected code store reply");
    InfrastructureError::UnexpectedReply(format!("{} script returned {}", operation, reply)).into()
}
