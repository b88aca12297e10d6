use std::time::Duration;

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;

use super::mocks::{args, recipients, ScriptedProvider};
use crate::sms::RetrySender;

#[tokio::test(start_paused = true)]
async fn test_retries_until_success() {
    let provider = ScriptedProvider::scripted(
        "primary",
        vec![Err(SmsError::provider("primary", "503")), Err(SmsError::provider("primary", "503"))],
    );
    let sender = RetrySender::new(provider.clone(), 3, Duration::from_millis(100));

    sender
        .send(&RequestContext::background(), "verify_code", &args(), &recipients())
        .await
        .unwrap();
    assert_eq!(provider.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_is_bounded() {
    let provider = ScriptedProvider::failing("primary");
    let sender = RetrySender::new(provider.clone(), 2, Duration::from_millis(100));

    let result = sender
        .send(&RequestContext::background(), "verify_code", &args(), &recipients())
        .await;

    assert!(matches!(result, Err(SmsError::Provider { .. })));
    assert_eq!(provider.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_errors_are_not_retried() {
    for error in [
        SmsError::Cancelled,
        SmsError::RateLimited,
        SmsError::Unauthorized {
            reason: "bad signature".to_string(),
        },
    ] {
        let provider = ScriptedProvider::scripted("primary", vec![Err(error.clone())]);
        let sender = RetrySender::new(provider.clone(), 3, Duration::from_millis(100));

        let result = sender
            .send(&RequestContext::background(), "verify_code", &args(), &recipients())
            .await;

        assert_eq!(result, Err(error));
        assert_eq!(provider.calls(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_backoff_cancels() {
    let provider = ScriptedProvider::failing("primary");
    let sender = RetrySender::new(provider.clone(), 5, Duration::from_secs(1));
    let ctx = RequestContext::with_timeout(Duration::from_millis(1500));

    let result = sender.send(&ctx, "verify_code", &args(), &recipients()).await;

    // Attempt at 0s, retry after 1s, deadline hits during the 2s backoff
    assert_eq!(result, Err(SmsError::Cancelled));
    assert_eq!(provider.calls(), 2);
}
