//! Outbound rate limit layer

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::TemplateArg;
use cg_core::errors::SmsError;
use cg_core::services::rate_limit::Limiter;
use cg_core::services::sms::SmsSender;

/// Consults a sliding-window limiter under a fixed channel key before
/// delegating. A limiter failure counts as limited.
pub struct RateLimitedSender {
    inner: Arc<dyn SmsSender>,
    limiter: Arc<dyn Limiter>,
    key: String,
}

impl RateLimitedSender {
    pub fn new(inner: Arc<dyn SmsSender>, limiter: Arc<dyn Limiter>, key: impl Into<String>) -> Self {
        Self {
            inner,
            limiter,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SmsSender for RateLimitedSender {
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        match ctx.run(self.limiter.limit(&self.key)).await? {
            Ok(false) => {}
            Ok(true) => {
                warn!(provider = %self.inner.name(), key = %self.key, "SMS rate limit reached");
                return Err(SmsError::RateLimited);
            }
            Err(e) => {
                error!(
                    provider = %self.inner.name(),
                    key = %self.key,
                    error = %e,
                    "Rate limiter unavailable, rejecting send"
                );
                return Err(SmsError::RateLimited);
            }
        }

        self.inner.send(ctx, template_id, args, recipients).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
