//! In-process walkthrough of the verification code flow
//!
//! Builds the dispatch chain with in-memory components, sends a code and
//! verifies it. No Redis or SMS account required.
//!
//! Run with: cargo run -p cg_infra --example dispatch_demo

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cg_core::context::RequestContext;
use cg_core::services::sms::SmsSender;
use cg_core::services::verification::{CodeService, CodeServiceConfig};
use cg_infra::cache::MemoryCodeStore;
use cg_infra::ratelimit::MemorySlidingWindowLimiter;
use cg_infra::sms::{MemorySmsProvider, RateLimitedSender, RetrySender, TimeoutFailoverSender};
use cg_shared::config::AppConfig;
use cg_shared::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    let limiter = Arc::new(MemorySlidingWindowLimiter::from_config(&config.sms.rate_limit));
    let primary = Arc::new(MemorySmsProvider::new("primary", config.sms.templates.clone()));
    let backup = Arc::new(MemorySmsProvider::new("backup", config.sms.templates.clone()));

    let providers: Vec<Arc<dyn SmsSender>> = vec![primary.clone() as Arc<dyn SmsSender>, backup];
    let chain = Arc::new(RateLimitedSender::new(
        Arc::new(RetrySender::from_config(
            Arc::new(TimeoutFailoverSender::new(providers, config.sms.timeout_threshold)),
            &config.sms.retry,
        )),
        limiter,
        config.sms.channel_key(),
    ));

    let store = Arc::new(MemoryCodeStore::new(&config.verification));
    let service = CodeService::new(
        store,
        chain,
        CodeServiceConfig::from_config(&config.verification, config.environment),
    );

    let phone = "+15550001";
    let ctx = RequestContext::with_timeout(Duration::from_secs(5));
    let sent = service.send(&ctx, "login", phone).await?;
    println!("Code sent, valid for {}s, resend after {}s", sent.expires_in, sent.resend_after);

    let body = primary
        .last_message_to(phone)
        .context("primary provider captured no message")?;
    println!("Captured message: {}", body);

    let code: String = body.chars().filter(|c| c.is_ascii_digit()).take(config.verification.code_length).collect();
    let outcome = service.verify(&ctx, "login", phone, &code).await?;
    println!("Verification matched: {}", outcome.is_matched());

    match service.send(&ctx, "login", phone).await {
        Ok(_) => println!("Resend accepted"),
        Err(e) => println!("Resend rejected: {}", e),
    }

    Ok(())
}
