//! Dispatch chain assembly

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use cg_core::services::rate_limit::Limiter;
use cg_core::services::sms::SmsSender;
use cg_shared::config::{FailoverStrategy, ProviderConfig, ProviderKind, SmsConfig};

use super::{
    FailoverSender, MemorySmsProvider, RateLimitedSender, RetrySender, TemplateAuthSender,
    TimeoutFailoverSender, TwilioSmsProvider,
};
use crate::InfrastructureError;

/// Create the raw provider for one entry of `SmsConfig::providers`
pub fn build_provider(
    provider: &ProviderConfig,
    config: &SmsConfig,
) -> Result<Arc<dyn SmsSender>, InfrastructureError> {
    let sender: Arc<dyn SmsSender> = match provider.kind {
        ProviderKind::Memory => Arc::new(MemorySmsProvider::new(
            provider.name.clone(),
            config.templates.clone(),
        )),
        ProviderKind::Twilio => Arc::new(TwilioSmsProvider::new(
            provider.clone(),
            config.templates.clone(),
        )?),
    };
    Ok(sender)
}

/// Build the full dispatch chain
///
/// The providers are combined by the configured failover strategy and
/// wrapped in retry when enabled. The channel rate limit sits above both, so
/// each send consults the limiter once however many providers or retries it
/// takes. Template authorization is outermost.
pub fn build_sms_sender(
    config: &SmsConfig,
    limiter: Arc<dyn Limiter>,
) -> Result<Arc<dyn SmsSender>, InfrastructureError> {
    if config.providers.is_empty() {
        return Err(InfrastructureError::Config(
            "At least one SMS provider must be configured".to_string(),
        ));
    }

    let providers = config
        .providers
        .iter()
        .map(|provider| build_provider(provider, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sender: Arc<dyn SmsSender> = match config.strategy {
        FailoverStrategy::Static => Arc::new(FailoverSender::new(providers)),
        FailoverStrategy::RoundRobin => Arc::new(FailoverSender::round_robin(providers)),
        FailoverStrategy::Timeout => {
            Arc::new(TimeoutFailoverSender::new(providers, config.timeout_threshold))
        }
    };

    if config.retry.max_retries > 0 {
        sender = Arc::new(RetrySender::new(
            sender,
            config.retry.max_retries,
            Duration::from_millis(config.retry.backoff_ms),
        ));
    }

    if config.rate_limit.enabled {
        sender = Arc::new(RateLimitedSender::new(sender, limiter, config.channel_key()));
    }

    if let Some(secret) = config.template_secret.as_deref() {
        sender = Arc::new(TemplateAuthSender::new(sender, secret));
    }

    info!(
        providers = config.providers.len(),
        strategy = ?config.strategy,
        channel = %config.channel,
        rate_limited = config.rate_limit.enabled,
        max_retries = config.retry.max_retries,
        template_auth = config.template_secret.is_some(),
        "SMS dispatch chain assembled"
    );

    Ok(sender)
}
