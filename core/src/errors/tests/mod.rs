//! Unit tests for domain error types

use crate::context::DeadlineExceeded;
use crate::errors::{
    extract_chinese_message, extract_english_message, CodeError, DomainError, ErrorResponse,
    SmsError, TokenError,
};

#[test]
fn test_code_error_messages_are_bilingual() {
    let message = CodeError::SendTooFrequent.to_string();
    assert_eq!(extract_english_message(&message), "Verification code requested too frequently");
    assert_eq!(extract_chinese_message(&message), "验证码发送太频繁");
}

#[test]
fn test_error_codes() {
    assert_eq!(CodeError::TooManyAttempts.error_code(), "VERIFY_TOO_MANY_ATTEMPTS");
    assert_eq!(SmsError::AllProvidersFailed { attempts: 2 }.error_code(), "ALL_PROVIDERS_FAILED");
    assert_eq!(TokenError::SessionRevoked.error_code(), "SESSION_REVOKED");

    let bridged: DomainError = CodeError::NotFound.into();
    assert_eq!(bridged.error_code(), "CODE_NOT_FOUND");
}

#[test]
fn test_sms_error_classification() {
    assert!(SmsError::ProviderTimeout { provider: "a".into() }.is_timeout());
    assert!(SmsError::ProviderTimeout { provider: "a".into() }.is_retryable());
    assert!(SmsError::provider("a", "boom").is_retryable());
    assert!(!SmsError::provider("a", "boom").is_timeout());

    assert!(!SmsError::Cancelled.is_retryable());
    assert!(!SmsError::RateLimited.is_retryable());
    assert!(!SmsError::Unauthorized { reason: "bad".into() }.is_retryable());
}

#[test]
fn test_deadline_conversions() {
    assert_eq!(SmsError::from(DeadlineExceeded), SmsError::Cancelled);
    assert_eq!(DomainError::from(DeadlineExceeded), DomainError::DeadlineExceeded);
}

#[test]
fn test_policy_violations() {
    assert!(DomainError::from(CodeError::SendTooFrequent).is_policy_violation());
    assert!(DomainError::from(SmsError::RateLimited).is_policy_violation());
    assert!(DomainError::from(TokenError::SessionRevoked).is_policy_violation());
    assert!(!DomainError::from(CodeError::system("redis down")).is_policy_violation());
}

#[test]
fn test_error_response_from_domain_error() {
    let err = DomainError::from(TokenError::FingerprintMismatch);
    let response = ErrorResponse::from(&err);
    assert_eq!(response.error, "FINGERPRINT_MISMATCH");
    assert!(response.message.contains("令牌与客户端不匹配"));
}

#[test]
fn test_message_extraction() {
    let bilingual = "Invalid token | 无效的令牌";
    assert_eq!(extract_english_message(bilingual), "Invalid token");
    assert_eq!(extract_chinese_message(bilingual), "无效的令牌");

    let english_only = "Only English";
    assert_eq!(extract_english_message(english_only), "Only English");
    assert_eq!(extract_chinese_message(english_only), "Only English");
}
