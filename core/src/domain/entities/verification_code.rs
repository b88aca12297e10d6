//! Verification code record and the shared issue/verify rules.

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

use crate::errors::CodeError;

/// Verification attempts granted to each issued code
pub const MAX_ATTEMPTS: i64 = 3;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Total lifetime of an issued code (10 minutes)
pub const CODE_EXPIRY_SECONDS: u64 = 600;

/// Minimum spacing between two issues for the same recipient
pub const RESEND_COOLDOWN_SECONDS: u64 = 60;

/// Shared store key for a (scope, recipient) pair
pub fn code_key(scope: &str, recipient: &str) -> String {
    format!("phone_code:{}:{}", scope, recipient)
}

/// Generate a numeric code of `length` digits from the OS CSPRNG
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Result of a verification that consumed an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyOutcome {
    /// Code matched, the record is consumed
    Matched,
    /// Code did not match, one attempt was spent
    Mismatch,
}

impl VerifyOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, VerifyOutcome::Matched)
    }
}

/// Code value plus remaining attempts for one (scope, recipient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    pub attempts_left: i64,
}

impl CodeRecord {
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_attempts(code, MAX_ATTEMPTS)
    }

    pub fn with_attempts(code: impl Into<String>, attempts: i64) -> Self {
        Self {
            code: code.into(),
            attempts_left: attempts,
        }
    }

    /// Spend one attempt, then compare
    ///
    /// The attempt is taken before the comparison so that no comparison
    /// ever runs without a matching decrement. The caller deletes the
    /// record on `Matched`.
    pub fn try_verify(&mut self, input: &str) -> Result<VerifyOutcome, CodeError> {
        if self.attempts_left <= 0 {
            return Err(CodeError::TooManyAttempts);
        }
        self.attempts_left -= 1;

        if constant_time_eq(self.code.as_bytes(), input.as_bytes()) {
            Ok(VerifyOutcome::Matched)
        } else {
            Ok(VerifyOutcome::Mismatch)
        }
    }
}
