//! Message sending capability
//!
//! Providers and every dispatch policy (rate limit, failover, retry,
//! template authorization) implement the same [`SmsSender`] trait and wrap
//! one another.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::domain::entities::message::TemplateArg;
use crate::errors::SmsError;

/// Send a templated message to one or more recipients
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `template_id` rendered with `args` to every recipient
    ///
    /// Implementations honour `ctx`: once its deadline elapses they return
    /// `SmsError::Cancelled` without contacting further providers.
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError>;

    /// Name used in logs
    fn name(&self) -> &str {
        "sms"
    }
}
