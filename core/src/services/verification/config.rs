//! Configuration for the code service

use cg_shared::config::{Environment, VerificationConfig};

use crate::domain::entities::verification_code::{
    CODE_EXPIRY_SECONDS, CODE_LENGTH, RESEND_COOLDOWN_SECONDS,
};

/// Configuration for the code service
#[derive(Debug, Clone)]
pub struct CodeServiceConfig {
    /// Digits per generated code
    pub code_length: usize,
    /// Template the code is delivered with
    pub template_id: String,
    /// Code lifetime reported to callers
    pub expiry_seconds: u64,
    /// Resend cooldown reported to callers
    pub resend_cooldown_seconds: u64,
    /// Emit plaintext codes at debug level
    pub log_codes: bool,
}

impl Default for CodeServiceConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            template_id: String::from(cg_shared::config::sms::DEFAULT_CODE_TEMPLATE_ID),
            expiry_seconds: CODE_EXPIRY_SECONDS,
            resend_cooldown_seconds: RESEND_COOLDOWN_SECONDS,
            log_codes: false,
        }
    }
}

impl CodeServiceConfig {
    pub fn from_config(config: &VerificationConfig, environment: Environment) -> Self {
        Self {
            code_length: config.code_length,
            template_id: config.template_id.clone(),
            expiry_seconds: config.expiry_seconds,
            resend_cooldown_seconds: config.resend_cooldown_seconds,
            log_codes: environment.allows_code_logging(),
        }
    }
}
