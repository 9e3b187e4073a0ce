//! Redaction policy
//!
//! Immutable, built once from the run configuration and shared by the
//! classifier and the content filters.

/// Default value substituted for a stripped IP address
pub const DEFAULT_SENTINEL: &str = "redacted-ip";

/// Address left untouched by the metadata redactor
pub const LOOPBACK_IP: &[u8] = b"127.0.0.1";

/// What to strip from the archived tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPolicy {
    /// Replace IPs in change logs and page metadata
    pub strip_ips: bool,
    /// Replace the user credential file with an empty stub
    pub exclude_users: bool,
    /// Value written in place of a stripped IP
    pub sentinel: String,
}

impl RedactionPolicy {
    /// The sentinel as raw bytes
    pub fn sentinel_bytes(&self) -> &[u8] {
        self.sentinel.as_bytes()
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            strip_ips: true,
            exclude_users: true,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}
