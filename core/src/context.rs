//! Request-scoped deadline propagation
//!
//! Every store round-trip and provider call runs through
//! [`RequestContext::run`], so a caller that gives up stops all downstream
//! work at the next suspension point.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// The caller's deadline elapsed before the operation completed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Request deadline exceeded | 请求已超时")]
pub struct DeadlineExceeded;

/// Caller context carried through services and dispatch layers
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context without a deadline
    pub fn background() -> Self {
        Self { deadline: None }
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// Race `fut` against the deadline
    ///
    /// An already expired context fails without polling `fut`.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        match self.deadline {
            None => Ok(fut.await),
            Some(_) if self.is_expired() => Err(DeadlineExceeded),
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| DeadlineExceeded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_context_never_expires() {
        let ctx = RequestContext::background();
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_expired());
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(100));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(result, Err(DeadlineExceeded));
        assert!(ctx.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_context_skips_future() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;

        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = ctx
            .run(async { polled.store(true, std::sync::atomic::Ordering::SeqCst) })
            .await;

        assert_eq!(result, Err(DeadlineExceeded));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }
}
