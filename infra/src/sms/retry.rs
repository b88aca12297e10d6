//! Bounded retry layer

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::TemplateArg;
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;
use cg_shared::config::RetryConfig;

/// Retries retryable failures with exponential backoff
///
/// The backoff sleep is bounded by the caller's deadline. Cancellation,
/// throttling and authorization errors are returned on the first attempt.
pub struct RetrySender {
    inner: Arc<dyn SmsSender>,
    max_retries: u32,
    backoff: Duration,
}

impl RetrySender {
    pub fn new(inner: Arc<dyn SmsSender>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }

    pub fn from_config(inner: Arc<dyn SmsSender>, config: &RetryConfig) -> Self {
        Self::new(inner, config.max_retries, Duration::from_millis(config.backoff_ms))
    }
}

#[async_trait]
impl SmsSender for RetrySender {
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        let mut attempt = 0;
        let mut delay = self.backoff;

        loop {
            match self.inner.send(ctx, template_id, args, recipients).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "SMS send failed, retrying in {:?}",
                        delay
                    );
                    ctx.run(tokio::time::sleep(delay)).await?;
                    delay = delay.saturating_mul(2);
                }
                Err(e) => {
                    debug!(provider = %self.inner.name(), attempt, error = %e, "SMS send not retried");
                    return Err(e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
