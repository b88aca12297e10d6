//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{
    extract_chinese_message, extract_english_message, CodeError, ErrorResponse, LimiterError,
    SmsError, TokenError,
};

use thiserror::Error;

use crate::context::DeadlineExceeded;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message} | 参数校验失败: {message}")]
    Validation { message: String },

    #[error("Internal error: {message} | 内部错误: {message}")]
    Internal { message: String },

    #[error("Request deadline exceeded | 请求已超时")]
    DeadlineExceeded,

    // Bridge to specific error types
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error(transparent)]
    Sms(#[from] SmsError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            DomainError::Code(e) => e.error_code(),
            DomainError::Sms(e) => e.error_code(),
            DomainError::Token(e) => e.error_code(),
        }
    }

    /// Expected business outcomes as opposed to system failures
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            DomainError::Code(CodeError::SendTooFrequent)
                | DomainError::Code(CodeError::TooManyAttempts)
                | DomainError::Sms(SmsError::RateLimited)
                | DomainError::Token(TokenError::SessionRevoked)
        )
    }
}

impl From<DeadlineExceeded> for DomainError {
    fn from(_: DeadlineExceeded) -> Self {
        DomainError::DeadlineExceeded
    }
}

impl From<DeadlineExceeded> for SmsError {
    fn from(_: DeadlineExceeded) -> Self {
        SmsError::Cancelled
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        ErrorResponse::new(err.error_code(), err)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
