//! Message dispatch configuration
//!
//! Describes the provider list, how the dispatch chain fails over between
//! providers, the retry policy and the message templates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::env_or;
use super::rate_limit::RateLimitConfig;

/// Template used for verification code messages when none is configured
pub const DEFAULT_CODE_TEMPLATE_ID: &str = "verify_code";

/// Kind of message provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// In-process provider that only logs messages
    Memory,
    /// Twilio REST API
    Twilio,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mock" => Ok(ProviderKind::Memory),
            "twilio" => Ok(ProviderKind::Twilio),
            other => Err(format!("Unknown SMS provider: {}", other)),
        }
    }
}

/// How the chain picks providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverStrategy {
    /// Always start from the first provider, fall through on failure
    Static,
    /// Start from a rotating index, fall through on failure
    RoundRobin,
    /// Stick to one provider until it times out `timeout_threshold` times in a row
    Timeout,
}

impl std::str::FromStr for FailoverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(FailoverStrategy::Static),
            "round_robin" | "round-robin" | "rotating" => Ok(FailoverStrategy::RoundRobin),
            "timeout" => Ok(FailoverStrategy::Timeout),
            other => Err(format!("Unknown failover strategy: {}", other)),
        }
    }
}

/// Settings for one provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Display name used in logs
    pub name: String,
    /// Provider kind
    pub kind: ProviderKind,
    /// Account identifier (Twilio Account SID)
    #[serde(default)]
    pub account_sid: String,
    /// Account secret (Twilio Auth Token)
    #[serde(default)]
    pub auth_token: String,
    /// Sender number in E.164 format
    #[serde(default)]
    pub from_number: String,
    /// API base URL, overridable for tests and proxies
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,
    /// Per request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ProviderConfig {
    /// In-process provider with the given name
    pub fn memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Memory,
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            base_url: default_twilio_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Twilio provider loaded from `TWILIO_*` variables
    pub fn twilio_from_env() -> Self {
        Self {
            name: String::from("twilio"),
            kind: ProviderKind::Twilio,
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            from_number: std::env::var("TWILIO_FROM_NUMBER").unwrap_or_default(),
            base_url: std::env::var("TWILIO_BASE_URL").unwrap_or_else(|_| default_twilio_base_url()),
            request_timeout_secs: env_or("TWILIO_REQUEST_TIMEOUT_SECS", default_request_timeout()),
        }
    }
}

/// Bounded retry policy wrapped around the whole chain
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Additional attempts after the first one (0 disables the layer)
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds, doubled per retry
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 200,
        }
    }
}

/// Complete dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Providers in preference order
    pub providers: Vec<ProviderConfig>,

    /// Failover strategy across providers
    #[serde(default = "default_strategy")]
    pub strategy: FailoverStrategy,

    /// Consecutive timeouts before the timeout strategy rotates
    #[serde(default = "default_timeout_threshold")]
    pub timeout_threshold: u32,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Outbound channel name, shared by every instance sending through it
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Outbound rate limit for the whole channel
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Message bodies keyed by template id, `{name}` placeholders are substituted
    #[serde(default = "default_templates")]
    pub templates: HashMap<String, String>,

    /// When set, template ids must be tokens signed with this secret
    #[serde(default)]
    pub template_secret: Option<String>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderConfig::memory("memory")],
            strategy: default_strategy(),
            timeout_threshold: default_timeout_threshold(),
            retry: RetryConfig::default(),
            channel: default_channel(),
            rate_limit: RateLimitConfig::default(),
            templates: default_templates(),
            template_secret: None,
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    ///
    /// `SMS_PROVIDERS` is a comma separated list such as `twilio,memory`.
    pub fn from_env() -> Self {
        let providers = std::env::var("SMS_PROVIDERS")
            .unwrap_or_else(|_| "memory".to_string())
            .split(',')
            .filter(|p| !p.trim().is_empty())
            .filter_map(|p| match p.parse::<ProviderKind>() {
                Ok(ProviderKind::Twilio) => Some(ProviderConfig::twilio_from_env()),
                Ok(ProviderKind::Memory) => Some(ProviderConfig::memory(p.trim())),
                Err(e) => {
                    tracing::warn!("Ignoring SMS provider entry: {}", e);
                    None
                }
            })
            .collect();

        let defaults = Self::default();
        Self {
            providers,
            strategy: std::env::var("SMS_FAILOVER_STRATEGY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.strategy),
            timeout_threshold: env_or("SMS_TIMEOUT_THRESHOLD", defaults.timeout_threshold),
            retry: RetryConfig {
                max_retries: env_or("SMS_MAX_RETRIES", defaults.retry.max_retries),
                backoff_ms: env_or("SMS_RETRY_BACKOFF_MS", defaults.retry.backoff_ms),
            },
            channel: std::env::var("SMS_CHANNEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.channel),
            rate_limit: RateLimitConfig::from_env(),
            templates: defaults.templates,
            template_secret: std::env::var("SMS_TEMPLATE_SECRET").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Limiter key for the outbound channel
    pub fn channel_key(&self) -> String {
        format!("sms:{}", self.channel)
    }

    /// Look up a template body
    pub fn template(&self, template_id: &str) -> Option<&str> {
        self.templates.get(template_id).map(String::as_str)
    }
}

fn default_channel() -> String {
    String::from("default")
}

fn default_strategy() -> FailoverStrategy {
    FailoverStrategy::Timeout
}

fn default_timeout_threshold() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    10
}

fn default_twilio_base_url() -> String {
    String::from("https://api.twilio.com")
}

fn default_templates() -> HashMap<String, String> {
    let mut templates = HashMap::new();
    templates.insert(
        DEFAULT_CODE_TEMPLATE_ID.to_string(),
        "Your verification code is {code}. It expires in 10 minutes.".to_string(),
    );
    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("static".parse::<FailoverStrategy>().unwrap(), FailoverStrategy::Static);
        assert_eq!("round-robin".parse::<FailoverStrategy>().unwrap(), FailoverStrategy::RoundRobin);
        assert_eq!("timeout".parse::<FailoverStrategy>().unwrap(), FailoverStrategy::Timeout);
        assert!("random".parse::<FailoverStrategy>().is_err());
    }

    #[test]
    fn test_parse_provider_kind() {
        assert_eq!("Twilio".parse::<ProviderKind>().unwrap(), ProviderKind::Twilio);
        assert_eq!("mock".parse::<ProviderKind>().unwrap(), ProviderKind::Memory);
        assert!("carrier-pigeon".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_channel_key() {
        let mut config = SmsConfig::default();
        assert_eq!(config.channel_key(), "sms:default");

        config.channel = "AC123".to_string();
        assert_eq!(config.channel_key(), "sms:AC123");
    }

    #[test]
    fn test_default_code_template() {
        let config = SmsConfig::default();
        let body = config.template(DEFAULT_CODE_TEMPLATE_ID).unwrap();
        assert!(body.contains("{code}"));
        assert_eq!(config.strategy, FailoverStrategy::Timeout);
        assert_eq!(config.timeout_threshold, 3);
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let json = r#"{"providers":[{"name":"primary","kind":"memory"}]}"#;
        let config: SmsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].request_timeout_secs, 10);
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.template(DEFAULT_CODE_TEMPLATE_ID).is_some());
    }
}
