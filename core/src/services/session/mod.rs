//! Session and credential management
//!
//! - Access/refresh credential pair bound by a session id
//! - Client fingerprint binding of access credentials
//! - Central revocation through a sentinel in the shared store
//! - Renewal of access credentials close to expiry

mod service;

#[cfg(test)]
mod tests;

pub use service::{extract_bearer_token, SessionService};
