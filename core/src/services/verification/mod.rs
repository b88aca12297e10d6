//! Verification code workflow
//!
//! - Atomic issue with per-recipient resend cooldown
//! - Verification with a bounded attempt budget and one-time use
//! - Delivery of the issued code through the message dispatch chain

mod config;
mod service;
mod traits;
mod types;


pub use config::CodeServiceConfig;
pub use service::CodeService;
pub use traits::CodeStore;
pub use types::SendCodeResult;
