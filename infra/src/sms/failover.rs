//! Ordered failover across providers
//!
//! Tries providers one after another until one succeeds. In static mode
//! every send starts from the first provider. In round-robin mode the
//! starting provider advances on every call so load spreads across the list.
//! A cancelled send stops the walk immediately in both modes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::TemplateArg;
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;
use cg_shared::utils::phone::mask_recipients;

pub struct FailoverSender {
    providers: Vec<Arc<dyn SmsSender>>,
    rotate: bool,
    next: AtomicUsize,
}

impl FailoverSender {
    /// Always prefer the first provider
    pub fn new(providers: Vec<Arc<dyn SmsSender>>) -> Self {
        Self {
            providers,
            rotate: false,
            next: AtomicUsize::new(0),
        }
    }

    /// Start each send one provider further along the list
    pub fn round_robin(providers: Vec<Arc<dyn SmsSender>>) -> Self {
        Self {
            providers,
            rotate: true,
            next: AtomicUsize::new(0),
        }
    }

    fn start_index(&self) -> usize {
        if self.rotate {
            self.next.fetch_add(1, Ordering::Relaxed) % self.providers.len()
        } else {
            0
        }
    }
}

#[async_trait]
impl SmsSender for FailoverSender {
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        if self.providers.is_empty() {
            return Err(SmsError::AllProvidersFailed { attempts: 0 });
        }

        let start = self.start_index();
        let len = self.providers.len();

        for offset in 0..len {
            if ctx.is_expired() {
                return Err(SmsError::Cancelled);
            }

            let provider = &self.providers[(start + offset) % len];
            match provider.send(ctx, template_id, args, recipients).await {
                Ok(()) => {
                    if offset > 0 {
                        info!(provider = %provider.name(), attempt = offset + 1, "SMS delivered by fallback provider");
                    }
                    return Ok(());
                }
                Err(SmsError::Cancelled) => return Err(SmsError::Cancelled),
                Err(e) => {
                    warn!(
                        provider = %provider.name(),
                        phone = %mask_recipients(recipients),
                        error = %e,
                        "SMS provider failed, trying next"
                    );
                }
            }
        }

        Err(SmsError::AllProvidersFailed { attempts: len })
    }

    fn name(&self) -> &str {
        if self.rotate {
            "round_robin_failover"
        } else {
            "failover"
        }
    }
}
