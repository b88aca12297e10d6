//! SMS providers and the dispatch chain
//!
//! Providers and policies all implement
//! [`SmsSender`](cg_core::services::SmsSender), so the policies stack as
//! decorators:
//!
//! ```text
//! TemplateAuthSender            (optional, signed template ids)
//!   RateLimitedSender           (optional, one key for the whole channel)
//!     RetrySender               (optional, bounded retry with backoff)
//!       FailoverSender | TimeoutFailoverSender
//!         MemorySmsProvider | TwilioSmsProvider
//! ```
//!
//! [`build_sms_sender`] assembles the chain from `SmsConfig`.

pub mod auth;
pub mod builder;
pub mod failover;
pub mod memory;
pub mod ratelimit;
pub mod retry;
pub mod timeout_failover;
pub mod twilio;

pub use auth::{sign_template_id, TemplateAuthSender, TemplateClaims};
pub use builder::{build_provider, build_sms_sender};
pub use failover::FailoverSender;
pub use memory::{MemorySmsProvider, SentMessage};
pub use ratelimit::RateLimitedSender;
pub use retry::RetrySender;
pub use timeout_failover::{DispatchState, TimeoutFailoverSender};
pub use twilio::TwilioSmsProvider;

#[cfg(test)]
mod tests;
