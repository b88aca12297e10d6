//! Recipient address utilities
//!
//! Recipients are phone numbers. Every log line that names one goes through
//! [`mask_phone_number`] first.

use once_cell::sync::Lazy;
use regex::Regex;

// Chinese mobile number without country code
static CHINA_MOBILE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("static regex"));

// E.164
static E164_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("static regex"));

/// Strip formatting characters, keeping digits and `+`
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a number is in E.164 format
pub fn is_e164(phone: &str) -> bool {
    E164_REGEX.is_match(&normalize_phone_number(phone))
}

/// Check if a recipient can be addressed by a provider
///
/// Accepts E.164 numbers and bare Chinese mobile numbers.
pub fn is_valid_recipient(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    E164_REGEX.is_match(&normalized) || CHINA_MOBILE_REGEX.is_match(&normalized)
}

/// Mask a phone number for logs (e.g., 138****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

/// Mask a list of recipients as one comma separated string
pub fn mask_recipients(recipients: &[String]) -> String {
    recipients
        .iter()
        .map(|r| mask_phone_number(r))
        .collect::<Vec<_>>()
        .join(",")
}
