//! # Codegate Core
//!
//! Domain layer of the verification code and session engine: entities, the
//! error taxonomy, request deadlines, capability traits implemented by the
//! infrastructure crate, and the code and session services.

pub mod context;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use context::{DeadlineExceeded, RequestContext};
pub use domain::*;
pub use errors::*;
pub use repositories::SessionRepository;
pub use services::{
    extract_bearer_token, CodeService, CodeServiceConfig, CodeStore, Limiter, SendCodeResult,
    SessionService, SmsSender,
};
