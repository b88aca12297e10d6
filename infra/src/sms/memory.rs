//! In-process SMS provider
//!
//! Renders the message, logs it and keeps a copy instead of delivering it.
//! Used for local development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::{render_template, TemplateArg};
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;
use cg_shared::utils::phone::{is_valid_recipient, mask_phone_number, normalize_phone_number};

/// A message accepted by [`MemorySmsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub template_id: String,
    pub recipient: String,
    pub body: String,
}

pub struct MemorySmsProvider {
    name: String,
    templates: HashMap<String, String>,
    outbox: Mutex<Vec<SentMessage>>,
}

impl MemorySmsProvider {
    pub fn new(name: impl Into<String>, templates: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            templates,
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Messages accepted so far, oldest first
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// Body of the most recent message sent to `recipient`
    pub fn last_message_to(&self, recipient: &str) -> Option<String> {
        let recipient = normalize_phone_number(recipient);
        self.sent_messages()
            .into_iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .map(|m| m.body)
    }
}

#[async_trait]
impl SmsSender for MemorySmsProvider {
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        if ctx.is_expired() {
            return Err(SmsError::Cancelled);
        }

        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| SmsError::provider(&self.name, format!("unknown template {}", template_id)))?;
        let body = render_template(template, args);

        let mut accepted = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let normalized = normalize_phone_number(recipient);
            if !is_valid_recipient(&normalized) {
                return Err(SmsError::InvalidRecipient {
                    recipient: mask_phone_number(recipient),
                });
            }
            accepted.push(SentMessage {
                template_id: template_id.to_string(),
                recipient: normalized,
                body: body.clone(),
            });
        }

        for message in &accepted {
            info!(
                provider = %self.name,
                phone = %mask_phone_number(&message.recipient),
                template = %template_id,
                "SMS captured by in-memory provider"
            );
        }

        self.outbox
            .lock()
            .map_err(|_| SmsError::provider(&self.name, "outbox lock poisoned"))?
            .extend(accepted);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemorySmsProvider {
        let mut templates = HashMap::new();
        templates.insert("verify_code".to_string(), "Code: {code}".to_string());
        MemorySmsProvider::new("memory", templates)
    }

    #[tokio::test]
    async fn test_records_rendered_message() {
        let provider = provider();
        provider
            .send(
                &RequestContext::background(),
                "verify_code",
                &[TemplateArg::new("code", "123456")],
                &["+15550001".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(provider.last_message_to("+15550001").as_deref(), Some("Code: 123456"));
        assert_eq!(provider.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_template_is_provider_error() {
        let provider = provider();
        let result = provider
            .send(&RequestContext::background(), "promo", &[], &["+15550001".to_string()])
            .await;
        assert!(matches!(result, Err(SmsError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejects_whole_batch() {
        let provider = provider();
        let result = provider
            .send(
                &RequestContext::background(),
                "verify_code",
                &[TemplateArg::new("code", "1")],
                &["+15550001".to_string(), "12".to_string()],
            )
            .await;

        assert!(matches!(result, Err(SmsError::InvalidRecipient { .. })));
        assert!(provider.sent_messages().is_empty());
    }
}
