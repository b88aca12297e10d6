use crate::repositories::session::{MockSessionRepository, SessionRepository};

#[tokio::test]
async fn test_mock_marks_and_reports_revocation() {
    let repo = MockSessionRepository::new();
    assert!(!repo.is_revoked("s1").await.unwrap());

    repo.mark_revoked("s1", 604800).await.unwrap();
    assert!(repo.is_revoked("s1").await.unwrap());
    assert!(!repo.is_revoked("s2").await.unwrap());
    assert_eq!(repo.sentinel_ttl("s1").await, Some(604800));
}

#[tokio::test]
async fn test_failing_mock_returns_internal_error() {
    let repo = MockSessionRepository::failing();
    assert!(repo.is_revoked("s1").await.is_err());
    assert!(repo.mark_revoked("s1", 1).await.is_err());
}
