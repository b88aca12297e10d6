//! Code store capability

use async_trait::async_trait;

use crate::domain::entities::verification_code::{generate_code, VerifyOutcome};
use crate::errors::CodeError;

/// Atomic per-(scope, recipient) code storage
///
/// Implementations must execute `store` and `verify` as single indivisible
/// operations against the backing store.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Write `code` with a fresh attempt budget and expiry
    ///
    /// # Returns
    /// * `Err(CodeError::SendTooFrequent)` - a code was issued within the resend cooldown,
    ///   the existing record is left untouched
    /// * `Err(CodeError::System)` - the existing record has no expiry, or the store failed
    async fn store(&self, scope: &str, recipient: &str, code: &str) -> Result<(), CodeError>;

    /// Spend one attempt and compare `input` with the stored code
    ///
    /// # Returns
    /// * `Ok(VerifyOutcome::Matched)` - the record has been deleted
    /// * `Ok(VerifyOutcome::Mismatch)` - the attempt was consumed
    /// * `Err(CodeError::NotFound)` - no live record
    /// * `Err(CodeError::TooManyAttempts)` - attempt budget already exhausted
    async fn verify(
        &self,
        scope: &str,
        recipient: &str,
        input: &str,
    ) -> Result<VerifyOutcome, CodeError>;

    /// Generate a `code_length` digit code and store it
    async fn issue(
        &self,
        scope: &str,
        recipient: &str,
        code_length: usize,
    ) -> Result<String, CodeError> {
        let code = generate_code(code_length);
        self.store(scope, recipient, &code).await?;
        Ok(code)
    }
}
