//! Consecutive-timeout failover
//!
//! Sends go to a single active provider. Only timeouts count against it:
//! after `threshold` consecutive timeouts the active index advances to the
//! next provider. Other errors are returned as they are without rotating.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::TemplateArg;
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;

/// Active provider index and consecutive timeout count for one instance
#[derive(Debug, Default)]
pub struct DispatchState {
    index: AtomicUsize,
    timeouts: AtomicU32,
}

impl DispatchState {
    pub fn active_index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    pub fn consecutive_timeouts(&self) -> u32 {
        self.timeouts.load(Ordering::Acquire)
    }

    /// Reset the streak of `index`, ignored once `index` is no longer active
    pub(crate) fn record_success(&self, index: usize) {
        if self.active_index() == index {
            self.timeouts.store(0, Ordering::Release);
        }
    }

    /// Count a timeout seen on `index`
    ///
    /// Returns the new active index when this caller performed the rotation.
    /// Results that arrive after `index` was rotated away are dropped, so a
    /// streak only ever counts timeouts of the active provider. Concurrent
    /// callers race on one compare-and-swap, so a streak rotates at most once.
    pub(crate) fn record_timeout(&self, index: usize, threshold: u32, len: usize) -> Option<usize> {
        if self.active_index() != index {
            return None;
        }

        let count = self.timeouts.fetch_add(1, Ordering::AcqRel) + 1;
        if count < threshold {
            return None;
        }

        let next = (index + 1) % len;
        match self
            .index
            .compare_exchange(index, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.timeouts.store(0, Ordering::Release);
                Some(next)
            }
            Err(_) => None,
        }
    }
}

pub struct TimeoutFailoverSender {
    providers: Vec<Arc<dyn SmsSender>>,
    threshold: u32,
    state: DispatchState,
}

impl TimeoutFailoverSender {
    pub fn new(providers: Vec<Arc<dyn SmsSender>>, threshold: u32) -> Self {
        Self {
            providers,
            threshold: threshold.max(1),
            state: DispatchState::default(),
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }
}

#[async_trait]
impl SmsSender for TimeoutFailoverSender {
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

        let len = self.providers.len();
        let index = self.state.active_index() % len;
        let provider = &self.providers[index];

        let result = provider.send(ctx, template_id, args, recipients).await;
        match &result {
            Ok(()) => self.state.record_success(index),
            Err(e) if e.is_timeout() => {
                if let Some(next) = self.state.record_timeout(index, self.threshold, len) {
                    warn!(
                        from = %provider.name(),
                        to = %self.providers[next].name(),
                        threshold = self.threshold,
                        "SMS provider kept timing out, switching active provider"
                    );
                }
            }
            Err(_) => {}
        }
        result
    }

    fn name(&self) -> &str {
        "timeout_failover"
    }
}
