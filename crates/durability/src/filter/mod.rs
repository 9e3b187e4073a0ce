//! Content filters
//!
//! A filter turns a source file into the bytes that go into the archive in
//! its place. Filters are pure functions of the file's current bytes and the
//! redaction policy; the result is fully materialized in memory so the
//! archive header can carry its exact length.
//!
//! Pass-through files never come through here. The archive writer streams
//! them straight from disk.

pub mod changes;
pub mod meta;
pub mod users;

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use wikivault_core::DecodeError;

use crate::policy::RedactionPolicy;

pub use changes::redact_changes;
pub use meta::{redact_meta, redact_meta_value};
pub use users::EMPTY_USERS_AUTH;

/// Errors produced while filtering one file
#[derive(Debug, Error)]
pub enum FilterError {
    /// A record does not have the expected shape
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// The file is not valid serialized data
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The source file could not be read
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

impl FilterError {
    /// Create a malformed-record error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// The closed set of content rewrites the classifier can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFilter {
    /// Tab-separated change log: blank out the second field of every line
    RedactChangesLog,
    /// Serialized page metadata: blank out `last_change.ip`
    RedactMetadata,
    /// Credential file: replace with a stub holding no users
    EmptyUserList,
}

impl ContentFilter {
    /// Produce the replacement content for `source`
    pub fn apply(&self, source: &Path, policy: &RedactionPolicy) -> FilterResult<Vec<u8>> {
        match self {
            ContentFilter::RedactChangesLog => {
                let input = fs::read(source)?;
                redact_changes(&input, policy.sentinel_bytes())
            }
            ContentFilter::RedactMetadata => {
                let input = fs::read(source)?;
                redact_meta(&input, policy)
            }
            ContentFilter::EmptyUserList => Ok(EMPTY_USERS_AUTH.to_vec()),
        }
    }

    /// Short name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            ContentFilter::RedactChangesLog => "changes",
            ContentFilter::RedactMetadata => "meta",
            ContentFilter::EmptyUserList => "users",
        }
    }
}
