use std::sync::Arc;

use cg_core::context::RequestContext;
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;

use super::mocks::{args, recipients, BrokenLimiter, CountingLimiter, ScriptedProvider};
use crate::sms::RateLimitedSender;

#[tokio::test]
async fn test_limited_send_never_reaches_provider() {
    let provider = ScriptedProvider::ok("primary");
    let limiter = CountingLimiter::new(2);
    let sender = RateLimitedSender::new(provider.clone(), limiter.clone(), "sms:ACprimary");
    let ctx = RequestContext::background();

    for _ in 0..2 {
        sender.send(&ctx, "verify_code", &args(), &recipients()).await.unwrap();
    }
    let result = sender.send(&ctx, "verify_code", &args(), &recipients()).await;

    assert_eq!(result, Err(SmsError::RateLimited));
    assert_eq!(provider.calls(), 2);
    assert_eq!(limiter.calls_for("sms:ACprimary"), 2);
}

#[tokio::test]
async fn test_limiter_failure_is_treated_as_limited() {
    let provider = ScriptedProvider::ok("primary");
    let sender = RateLimitedSender::new(provider.clone(), Arc::new(BrokenLimiter), "sms:primary");

    let result = sender
        .send(&RequestContext::background(), "verify_code", &args(), &recipients())
        .await;

    assert_eq!(result, Err(SmsError::RateLimited));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_context_is_cancelled() {
    let provider = ScriptedProvider::ok("primary");
    let sender = RateLimitedSender::new(provider.clone(), CountingLimiter::new(10), "sms:primary");
    let ctx = RequestContext::with_timeout(std::time::Duration::from_millis(10));
    tokio::time::advance(std::time::Duration::from_millis(20)).await;

    let result = sender.send(&ctx, "verify_code", &args(), &recipients()).await;
    assert_eq!(result, Err(SmsError::Cancelled));
    assert_eq!(provider.calls(), 0);
}
