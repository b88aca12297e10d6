//! Error types for verification codes, message dispatch and sessions
//!
//! Every message is bilingual ("English | 中文"); use
//! [`extract_english_message`] / [`extract_chinese_message`] to split them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verification code store outcomes that are not a plain match/mismatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Verification code requested too frequently | 验证码发送太频繁")]
    SendTooFrequent,

    #[error("Too many verification attempts. Please request a new code | 验证次数过多，请重新获取验证码")]
    TooManyAttempts,

    #[error("Verification code not found or expired | 验证码不存在或已过期")]
    NotFound,

    #[error("Code store failure: {message} | 验证码存储故障: {message}")]
    System { message: String },
}

impl CodeError {
    /// Wrap a store level failure
    pub fn system(message: impl Into<String>) -> Self {
        CodeError::System {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CodeError::SendTooFrequent => "SEND_TOO_FREQUENT",
            CodeError::TooManyAttempts => "VERIFY_TOO_MANY_ATTEMPTS",
            CodeError::NotFound => "CODE_NOT_FOUND",
            CodeError::System { .. } => "SYSTEM_ERROR",
        }
    }
}

/// Message dispatch failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    #[error("Message rate limit reached | 短信发送已被限流")]
    RateLimited,

    #[error("All {attempts} SMS providers failed | 全部 {attempts} 个短信服务商发送失败")]
    AllProvidersFailed { attempts: usize },

    #[error("SMS provider {provider} timed out | 短信服务商 {provider} 超时")]
    ProviderTimeout { provider: String },

    #[error("SMS provider {provider} failed: {message} | 短信服务商 {provider} 发送失败: {message}")]
    Provider { provider: String, message: String },

    #[error("Message dispatch cancelled by caller | 调用方已取消发送")]
    Cancelled,

    #[error("Template not authorized: {reason} | 短信模板未授权: {reason}")]
    Unauthorized { reason: String },

    #[error("Invalid recipient: {recipient} | 无效的接收号码: {recipient}")]
    InvalidRecipient { recipient: String },
}

impl SmsError {
    /// Build a non-timeout provider failure
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SmsError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Timeout-class failures drive consecutive-timeout failover
    pub fn is_timeout(&self) -> bool {
        matches!(self, SmsError::ProviderTimeout { .. })
    }

    /// Whether the retry layer may attempt the send again
    ///
    /// Caller cancellation, authorization, throttling and bad recipients
    /// will fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SmsError::AllProvidersFailed { .. }
                | SmsError::ProviderTimeout { .. }
                | SmsError::Provider { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SmsError::RateLimited => "RATE_LIMITED",
            SmsError::AllProvidersFailed { .. } => "ALL_PROVIDERS_FAILED",
            SmsError::ProviderTimeout { .. } => "PROVIDER_TIMEOUT",
            SmsError::Provider { .. } => "PROVIDER_ERROR",
            SmsError::Cancelled => "CANCELLED",
            SmsError::Unauthorized { .. } => "TEMPLATE_UNAUTHORIZED",
            SmsError::InvalidRecipient { .. } => "INVALID_RECIPIENT",
        }
    }
}

/// Session credential failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid or expired token | 无效或已过期的令牌")]
    InvalidToken,

    #[error("Token used from a different client | 令牌与客户端不匹配")]
    FingerprintMismatch,

    #[error("Session has been revoked. Please login again | 会话已注销，请重新登录")]
    SessionRevoked,

    #[error("Token generation failed | 令牌生成失败")]
    TokenGenerationFailed,
}

impl TokenError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::InvalidToken => "INVALID_TOKEN",
            TokenError::FingerprintMismatch => "FINGERPRINT_MISMATCH",
            TokenError::SessionRevoked => "SESSION_REVOKED",
            TokenError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
        }
    }
}

/// Limiter backend failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimiterError {
    #[error("Rate limiter unavailable: {message} | 限流服务不可用: {message}")]
    Unavailable { message: String },
}

/// Error body handed to transport layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine readable code
    pub error: String,
    /// Bilingual message
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Helper function to extract English message from bilingual error
pub fn extract_english_message(message: &str) -> &str {
    message.split(" | ").next().unwrap_or(message)
}

/// Helper function to extract Chinese message from bilingual error
pub fn extract_chinese_message(message: &str) -> &str {
    message.split(" | ").nth(1).unwrap_or(message)
}
