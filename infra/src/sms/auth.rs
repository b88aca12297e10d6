//! Signed template identifiers
//!
//! Callers outside the service do not pass a template id directly. They
//! pass an HS256 token whose `tpl` claim names the template, so only holders
//! of the shared secret can choose what gets sent.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use cg_core::context::RequestContext;
use cg_core::domain::entities::message::TemplateArg;
use cg_core::errors::SmsError;
use cg_core::services::sms::SmsSender;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateClaims {
    /// Real template id
    pub tpl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Produce the token a caller hands to [`TemplateAuthSender`]
pub fn sign_template_id(
    secret: &str,
    template_id: &str,
    expires_at: Option<i64>,
) -> jsonwebtoken::errors::Result<String> {
    let claims = TemplateClaims {
        tpl: template_id.to_string(),
        exp: expires_at,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub struct TemplateAuthSender {
    inner: Arc<dyn SmsSender>,
    key: DecodingKey,
    validation: Validation,
}

impl TemplateAuthSender {
    pub fn new(inner: Arc<dyn SmsSender>, secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is optional, checked only when present
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            inner,
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn authorize(&self, token: &str) -> Result<String, SmsError> {
        let data = decode::<TemplateClaims>(token, &self.key, &self.validation).map_err(|e| {
            warn!(error = %e, "Rejected SMS template token");
            SmsError::Unauthorized {
                reason: e.to_string(),
            }
        })?;

        if data.claims.tpl.is_empty() {
            return Err(SmsError::Unauthorized {
                reason: "empty template claim".to_string(),
            });
        }
        Ok(data.claims.tpl)
    }
}

#[async_trait]
impl SmsSender for TemplateAuthSender {
    async fn send(
        &self,
        ctx: &RequestContext,
        template_id: &str,
        args: &[TemplateArg],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        let template = self.authorize(template_id)?;
        self.inner.send(ctx, &template, args, recipients).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
