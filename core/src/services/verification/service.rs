//! Code service implementation

use std::sync::Arc;

use cg_shared::utils::phone::{is_valid_recipient, mask_phone_number, normalize_phone_number};

use crate::context::RequestContext;
use crate::domain::entities::message::TemplateArg;
use crate::domain::entities::verification_code::{generate_code, VerifyOutcome};
use crate::errors::{DomainError, DomainResult};
use crate::services::sms::SmsSender;

use super::config::CodeServiceConfig;
use super::traits::CodeStore;
use super::types::SendCodeResult;

/// Issues, delivers and verifies one-time codes
pub struct CodeService<C: CodeStore + ?Sized, S: SmsSender + ?Sized> {
    store: Arc<C>,
    sender: Arc<S>,
    config: CodeServiceConfig,
}

impl<C: CodeStore + ?Sized, S: SmsSender + ?Sized> CodeService<C, S> {
    pub fn new(store: Arc<C>, sender: Arc<S>, config: CodeServiceConfig) -> Self {
        Self {
            store,
            sender,
            config,
        }
    }

    /// Issue a code for (scope, recipient) and deliver it
    ///
    /// A failed delivery leaves the stored record in place. The caller may
    /// request a new code once the resend cooldown has passed.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        scope: &str,
        recipient: &str,
    ) -> DomainResult<SendCodeResult> {
        validate_scope(scope)?;
        let recipient = validate_recipient(recipient)?;
        let masked = mask_phone_number(&recipient);

        let code = generate_code(self.config.code_length);
        ctx.run(self.store.store(scope, &recipient, &code))
            .await?
            .map_err(|e| {
                tracing::warn!(
                    scope = scope,
                    phone = %masked,
                    error = %e,
                    event = "code_issue_rejected",
                    "Verification code was not issued"
                );
                e
            })?;

        if self.config.log_codes {
            tracing::debug!(scope = scope, phone = %masked, code = %code, "Issued verification code");
        }
        tracing::info!(scope = scope, phone = %masked, event = "code_issued", "Issued verification code");

        let args = [TemplateArg::new("code", code)];
        let recipients = [recipient];
        self.sender
            .send(ctx, &self.config.template_id, &args, &recipients)
            .await
            .map_err(|e| {
                tracing::error!(
                    scope = scope,
                    phone = %masked,
                    error = %e,
                    event = "code_delivery_failed",
                    "Verification code stored but delivery failed"
                );
                DomainError::from(e)
            })?;

        Ok(SendCodeResult {
            expires_in: self.config.expiry_seconds,
            resend_after: self.config.resend_cooldown_seconds,
        })
    }

    /// Check `input` against the live code for (scope, recipient)
    ///
    /// A mismatch is an `Ok` outcome. Exhausted attempts and a missing code
    /// are reported as `DomainError::Code`.
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        scope: &str,
        recipient: &str,
        input: &str,
    ) -> DomainResult<VerifyOutcome> {
        validate_scope(scope)?;
        let recipient = validate_recipient(recipient)?;
        let masked = mask_phone_number(&recipient);

        let outcome = ctx
            .run(self.store.verify(scope, &recipient, input))
            .await??;

        match outcome {
            VerifyOutcome::Matched => {
                tracing::info!(scope = scope, phone = %masked, event = "code_verified", "Verification code matched");
            }
            VerifyOutcome::Mismatch => {
                tracing::warn!(scope = scope, phone = %masked, event = "code_mismatch", "Verification code did not match");
            }
        }
        Ok(outcome)
    }
}

// Scopes become key segments, so they may not contain the separator.
fn validate_scope(scope: &str) -> DomainResult<()> {
    let valid = !scope.is_empty()
        && scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation {
            message: format!("Invalid code scope: {:?}", scope),
        })
    }
}

fn validate_recipient(recipient: &str) -> DomainResult<String> {
    if !is_valid_recipient(recipient) {
        return Err(DomainError::Validation {
            message: format!("Invalid phone number format: {}", mask_phone_number(recipient)),
        });
    }
    Ok(normalize_phone_number(recipient))
}
