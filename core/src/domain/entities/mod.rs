//! Domain entities representing core business objects.

pub mod message;
pub mod session;
pub mod verification_code;

pub use message::{render_template, TemplateArg};
pub use session::{session_revocation_key, AccessClaims, RefreshClaims, TokenPair};
pub use verification_code::{
    code_key, generate_code, CodeRecord, VerifyOutcome, CODE_EXPIRY_SECONDS, CODE_LENGTH,
    MAX_ATTEMPTS, RESEND_COOLDOWN_SECONDS,
};
