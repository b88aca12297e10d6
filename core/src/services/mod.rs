//! Business services and the capability traits they depend on.

pub mod rate_limit;
pub mod session;
pub mod sms;
pub mod verification;

pub use rate_limit::Limiter;
pub use session::{extract_bearer_token, SessionService};
pub use sms::SmsSender;
pub use verification::{CodeService, CodeServiceConfig, CodeStore, SendCodeResult};
