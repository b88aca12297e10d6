//! Unit tests for the session service

use std::sync::Arc;
use std::time::Duration;

use cg_shared::config::JwtConfig;

use crate::context::RequestContext;
use crate::errors::{DomainError, TokenError};
use crate::repositories::MockSessionRepository;
use crate::services::session::{extract_bearer_token, SessionService};

const UA: &str = "Mozilla/5.0 (test)";

fn config() -> JwtConfig {
    JwtConfig::new("test-access-secret", "test-refresh-secret")
}

fn service_with(config: JwtConfig) -> (SessionService<MockSessionRepository>, Arc<MockSessionRepository>) {
    let repo = Arc::new(MockSessionRepository::new());
    let service = SessionService::new(repo.clone(), config).unwrap();
    (service, repo)
}

#[test]
fn test_rejects_shared_secret() {
    let repo = Arc::new(MockSessionRepository::new());
    let result = SessionService::new(repo, JwtConfig::new("same", "same"));
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[test]
fn test_issue_and_validate_access() {
    let (service, _) = service_with(config());
    let pair = service.issue_session(42, UA).unwrap();

    assert_eq!(pair.access_expires_in, 1800);
    assert_eq!(pair.refresh_expires_in, 604800);

    let claims = service.validate_access(&pair.access_token, UA).unwrap();
    assert_eq!(claims.uid, 42);
    assert_eq!(claims.ssid, pair.session_id);
    assert_eq!(claims.user_agent, UA);
}

#[test]
fn test_sessions_get_unique_ids() {
    let (service, _) = service_with(config());
    let a = service.issue_session(1, UA).unwrap();
    let b = service.issue_session(1, UA).unwrap();
    assert_ne!(a.session_id, b.session_id);
}

#[test]
fn test_fingerprint_mismatch() {
    let (service, _) = service_with(config());
    let pair = service.issue_session(42, UA).unwrap();

    let result = service.validate_access(&pair.access_token, "curl/8.0");
    assert_eq!(result, Err(DomainError::Token(TokenError::FingerprintMismatch)));
}

#[test]
fn test_expired_access_is_invalid() {
    let mut config = config();
    config.access_token_expiry = -60;
    let (service, _) = service_with(config);
    let pair = service.issue_session(42, UA).unwrap();

    let result = service.validate_access(&pair.access_token, UA);
    assert_eq!(result, Err(DomainError::Token(TokenError::InvalidToken)));
}

#[test]
fn test_tampered_and_cross_type_credentials_are_invalid() {
    let (service, _) = service_with(config());
    let pair = service.issue_session(42, UA).unwrap();

    let mut tampered = pair.access_token.clone();
    tampered.push('x');
    assert_eq!(
        service.validate_access(&tampered, UA),
        Err(DomainError::Token(TokenError::InvalidToken))
    );

    // Refresh credentials are signed with the other secret
    assert_eq!(
        service.validate_access(&pair.refresh_token, UA),
        Err(DomainError::Token(TokenError::InvalidToken))
    );
}

#[test]
fn test_foreign_secret_is_invalid() {
    let (service, _) = service_with(config());
    let (other, _) = service_with(JwtConfig::new("other-access", "other-refresh"));
    let pair = other.issue_session(42, UA).unwrap();

    assert_eq!(
        service.validate_access(&pair.access_token, UA),
        Err(DomainError::Token(TokenError::InvalidToken))
    );
}

#[tokio::test]
async fn test_refresh_issues_access_for_same_session() {
    let (service, _) = service_with(config());
    let ctx = RequestContext::background();
    let pair = service.issue_session(7, UA).unwrap();

    let access = service.refresh(&ctx, &pair.refresh_token, UA).await.unwrap();
    let claims = service.validate_access(&access, UA).unwrap();
    assert_eq!(claims.uid, 7);
    assert_eq!(claims.ssid, pair.session_id);
}

#[tokio::test]
async fn test_refresh_rejects_access_credential() {
    let (service, _) = service_with(config());
    let pair = service.issue_session(7, UA).unwrap();

    let result = service
        .refresh(&RequestContext::background(), &pair.access_token, UA)
        .await;
    assert_eq!(result, Err(DomainError::Token(TokenError::InvalidToken)));
}

#[tokio::test]
async fn test_revoke_then_refresh_is_session_revoked() {
    let (service, repo) = service_with(config());
    let ctx = RequestContext::background();
    let pair = service.issue_session(7, UA).unwrap();

    service.revoke(&ctx, &pair.session_id).await.unwrap();
    assert_eq!(repo.sentinel_ttl(&pair.session_id).await, Some(604800));
    assert!(service.check_session_revoked(&ctx, &pair.session_id).await.unwrap());

    let result = service.refresh(&ctx, &pair.refresh_token, UA).await;
    assert_eq!(result, Err(DomainError::Token(TokenError::SessionRevoked)));
}

#[tokio::test]
async fn test_authenticate_checks_revocation() {
    let (service, _) = service_with(config());
    let ctx = RequestContext::background();
    let pair = service.issue_session(7, UA).unwrap();

    assert!(service.authenticate(&ctx, &pair.access_token, UA).await.is_ok());

    service.revoke(&ctx, &pair.session_id).await.unwrap();
    // Stateless validation still accepts the credential
    assert!(service.validate_access(&pair.access_token, UA).is_ok());
    assert_eq!(
        service.authenticate(&ctx, &pair.access_token, UA).await,
        Err(DomainError::Token(TokenError::SessionRevoked))
    );
}

#[tokio::test]
async fn test_refresh_fails_closed_when_store_is_down() {
    let repo = Arc::new(MockSessionRepository::failing());
    let service = SessionService::new(repo, config()).unwrap();
    let pair = service.issue_session(7, UA).unwrap();

    let result = service
        .refresh(&RequestContext::background(), &pair.refresh_token, UA)
        .await;
    assert!(matches!(result, Err(DomainError::Internal { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_revoke_respects_deadline() {
    let (service, repo) = service_with(config());
    let ctx = RequestContext::with_timeout(Duration::from_millis(1));
    tokio::time::advance(Duration::from_millis(5)).await;

    let result = service.revoke(&ctx, "s1").await;
    assert_eq!(result, Err(DomainError::DeadlineExceeded));
    assert_eq!(repo.sentinel_ttl("s1").await, None);
}

#[test]
fn test_renew_if_expiring() {
    let (service, _) = service_with(config());
    let pair = service.issue_session(9, UA).unwrap();
    let claims = service.validate_access(&pair.access_token, UA).unwrap();
    assert_eq!(service.renew_if_expiring(&claims).unwrap(), None);

    let mut short = config();
    short.access_token_expiry = 30;
    let (service, _) = service_with(short);
    let pair = service.issue_session(9, UA).unwrap();
    let claims = service.validate_access(&pair.access_token, UA).unwrap();

    let renewed = service.renew_if_expiring(&claims).unwrap().unwrap();
    let renewed_claims = service.validate_access(&renewed, UA).unwrap();
    assert_eq!(renewed_claims.ssid, claims.ssid);
    assert_eq!(renewed_claims.uid, 9);
}

#[test]
fn test_extract_bearer_token() {
    assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
    assert_eq!(extract_bearer_token("Basic abc"), None);
    assert_eq!(extract_bearer_token("Bearer"), None);
    assert_eq!(extract_bearer_token("Bearer a b"), None);
    assert_eq!(extract_bearer_token(""), None);
}
