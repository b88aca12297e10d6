//! Verification code policy

use serde::{Deserialize, Serialize};

use super::env_or;
use super::sms::DEFAULT_CODE_TEMPLATE_ID;

/// Where issued codes are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Shared Redis store, safe across replicas
    Redis,
    /// Process local store, single instance only
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" | "local" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown code store backend: {}", other)),
        }
    }
}

/// Verification code settings, shared by every code store backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Number of digits in a generated code
    pub code_length: usize,

    /// Verification attempts allowed per issued code
    pub max_attempts: i64,

    /// Code lifetime in seconds
    pub expiry_seconds: u64,

    /// Minimum seconds between two issues for the same recipient
    pub resend_cooldown_seconds: u64,

    /// Template used for the code message
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Store backend
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Maximum live entries in the in-process store
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_attempts: 3,
            expiry_seconds: 600,
            resend_cooldown_seconds: 60,
            template_id: default_template_id(),
            backend: default_backend(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_length: env_or("VERIFICATION_CODE_LENGTH", defaults.code_length),
            max_attempts: env_or("VERIFICATION_MAX_ATTEMPTS", defaults.max_attempts),
            expiry_seconds: env_or("VERIFICATION_EXPIRY_SECONDS", defaults.expiry_seconds),
            resend_cooldown_seconds: env_or("VERIFICATION_RESEND_COOLDOWN", defaults.resend_cooldown_seconds),
            template_id: std::env::var("VERIFICATION_TEMPLATE_ID").unwrap_or(defaults.template_id),
            backend: env_or("VERIFICATION_STORE", defaults.backend),
            memory_capacity: env_or("VERIFICATION_MEMORY_CAPACITY", defaults.memory_capacity),
        }
    }

    /// Remaining lifetime above which a reissue is rejected as too frequent
    pub fn reissue_threshold_seconds(&self) -> u64 {
        self.expiry_seconds.saturating_sub(self.resend_cooldown_seconds)
    }
}

fn default_template_id() -> String {
    DEFAULT_CODE_TEMPLATE_ID.to_string()
}

fn default_backend() -> StoreBackend {
    StoreBackend::Redis
}

fn default_memory_capacity() -> usize {
    10_000
}
