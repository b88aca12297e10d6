//! Twilio SMS provider
//!
//! Talks to the Twilio Messages REST API directly through `reqwest`:
//! one form POST per recipient, authenticated with the account SID and auth
//! token.
//!
//! Error classification feeds the dispatch policies above this provider:
//! - request timeouts become [`SmsError::ProviderTimeout`]
//! - non-success responses and transport failures become [`SmsError::Provider`]
//! - an elapsed caller deadline becomes [`SmsError::Cancelled`]

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::{render_template, TemplateArg};
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;
use cg_shared::config::ProviderConfig;
use cg_shared::utils::phone::{is_e164, is_valid_recipient, mask_phone_number, normalize_phone_number};

use crate::InfrastructureError;

/// Twilio limit for a single message body
const MAX_BODY_LENGTH: usize = 1600;

/// Error payload returned by the Twilio API
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Successful message creation payload
#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

/// Twilio SMS provider
pub struct TwilioSmsProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    templates: HashMap<String, String>,
}

impl TwilioSmsProvider {
    /// Create a provider from its settings and the shared template table
    pub fn new(
        config: ProviderConfig,
        templates: HashMap<String, String>,
    ) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(format!(
                "Twilio provider {} requires an account SID and auth token",
                config.name
            )));
        }
        if !is_e164(&config.from_number) {
            return Err(InfrastructureError::Config(format!(
                "Twilio provider {} sender number must be in E.164 format",
                config.name
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            provider = %config.name,
            from = %mask_phone_number(&config.from_number),
            "Twilio SMS provider initialized"
        );

        Ok(Self {
            client,
            config,
            templates,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Normalize to E.164, bare Chinese mobile numbers get the +86 prefix
    fn to_e164(&self, recipient: &str) -> Result<String, SmsError> {
        let normalized = normalize_phone_number(recipient);
        if is_e164(&normalized) {
            Ok(normalized)
        } else if is_valid_recipient(&normalized) {
            Ok(format!("+86{}", normalized))
        } else {
            Err(SmsError::InvalidRecipient {
                recipient: mask_phone_number(recipient),
            })
        }
    }

    async fn post_message(&self, to: &str, body: &str) -> Result<String, SmsError> {
        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_success() {
            let message: TwilioMessage = response.json().await.map_err(|e| self.classify(e))?;
            return Ok(message.sid);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    provider = %self.config.name,
                    status = %status,
                    error = %e,
                    "Failed to read Twilio error body, reporting status only"
                );
                String::new()
            }
        };
        Err(SmsError::provider(&self.config.name, error_detail(status, &text)))
    }

    fn classify(&self, err: reqwest::Error) -> SmsError {
        if err.is_timeout() {
            SmsError::ProviderTimeout {
                provider: self.config.name.clone(),
            }
        } else {
            SmsError::provider(&self.config.name, err.to_string())
        }
    }
}

/// Describe a rejected request from its status and, when readable, its body
fn error_detail(status: reqwest::StatusCode, text: &str) -> String {
    match serde_json::from_str::<TwilioErrorBody>(text) {
        Ok(TwilioErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{} {}: {}", status.as_u16(), code, message),
        _ if !text.is_empty() => format!("{}: {}", status, text),
        _ => status.to_string(),
    }
}

#[async_trait]
impl SmsSender for TwilioSmsProvider {
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        let template = self.templates.get(template_id).ok_or_else(|| {
            SmsError::provider(&self.config.name, format!("unknown template {}", template_id))
        })?;
        let body = render_template(template, args);
        if body.chars().count() > MAX_BODY_LENGTH {
            return Err(SmsError::provider(
                &self.config.name,
                "message exceeds maximum length of 1600 characters",
            ));
        }

        let targets = recipients
            .iter()
            .map(|r| self.to_e164(r))
            .collect::<Result<Vec<_>, _>>()?;

        let mut failures = Vec::new();
        for to in &targets {
            debug!(provider = %self.config.name, phone = %mask_phone_number(to), "Sending SMS via Twilio");

            match ctx.run(self.post_message(to, &body)).await? {
                Ok(sid) => {
                    info!(
                        provider = %self.config.name,
                        phone = %mask_phone_number(to),
                        sid = %sid,
                        "SMS sent"
                    );
                }
                // Later recipients would hit the same stalled endpoint
                Err(e) if e.is_timeout() => {
                    warn!(provider = %self.config.name, phone = %mask_phone_number(to), "Twilio request timed out");
                    return Err(e);
                }
                Err(e) => {
                    error!(provider = %self.config.name, phone = %mask_phone_number(to), error = %e, "SMS delivery failed");
                    failures.push(format!("{}: {}", mask_phone_number(to), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SmsError::provider(&self.config.name, failures.join("; ")))
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_shared::config::ProviderKind;

    fn config() -> ProviderConfig {
        ProviderConfig {
            name: "twilio".to_string(),
            kind: ProviderKind::Twilio,
            account_sid: "ACtest".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15551234567".to_string(),
            base_url: "https://api.twilio.com/".to_string(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let mut config = config();
        config.auth_token.clear();
        assert!(matches!(
            TwilioSmsProvider::new(config, HashMap::new()),
            Err(InfrastructureError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_non_e164_sender() {
        let mut config = config();
        config.from_number = "15551234567".to_string();
        assert!(TwilioSmsProvider::new(config, HashMap::new()).is_err());
    }

    #[test]
    fn test_messages_url() {
        let provider = TwilioSmsProvider::new(config(), HashMap::new()).unwrap();
        assert_eq!(
            provider.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/ACtest/Messages.json"
        );
    }

    #[test]
    fn test_recipient_normalization() {
        let provider = TwilioSmsProvider::new(config(), HashMap::new()).unwrap();
        assert_eq!(provider.to_e164("+1 (415) 555-2671").unwrap(), "+14155552671");
        assert_eq!(provider.to_e164("13812345678").unwrap(), "+8613812345678");
        assert!(matches!(
            provider.to_e164("12"),
            Err(SmsError::InvalidRecipient { .. })
        ));
    }

    #[test]
    fn test_error_detail() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            error_detail(status, r#"{"code":21211,"message":"Invalid 'To' Phone Number"}"#),
            "400 21211: Invalid 'To' Phone Number"
        );
        assert_eq!(error_detail(status, "gateway down"), "400 Bad Request: gateway down");
        // Unreadable body falls back to the status line
        assert_eq!(error_detail(status, ""), "400 Bad Request");
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_network() {
        let provider = TwilioSmsProvider::new(config(), HashMap::new()).unwrap();
        let result = provider
            .send(&RequestContext::background(), "missing", &[], &["+15550001".to_string()])
            .await;
        assert!(matches!(result, Err(SmsError::Provider { .. })));
    }
}
