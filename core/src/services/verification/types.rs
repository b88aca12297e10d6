//! Types for code service results

/// Result of issuing and delivering a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCodeResult {
    /// Seconds until the code expires
    pub expires_in: u64,
    /// Seconds until another code may be requested
    pub resend_after: u64,
}
