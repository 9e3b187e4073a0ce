//! Error types for the structured-value codec
//!
//! Every way a byte sequence can fail to decode (malformed header, truncated
//! payload, missing terminator, unsupported tag) is reported through one
//! error kind carrying the byte offset and a human-readable cause.

use thiserror::Error;

/// Result type alias for codec operations
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Decoding a structured value failed
///
/// Decoding is all-or-nothing: a `DecodeError` never comes with a partially
/// built value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode error at byte {offset}: {cause}")]
pub struct DecodeError {
    /// Byte offset into the input where the problem was detected
    pub offset: usize,
    /// Human-readable description of the problem
    pub cause: String,
}

impl DecodeError {
    /// Create a decode error at the given offset
    pub fn new(offset: usize, cause: impl Into<String>) -> Self {
        Self {
            offset,
            cause: cause.into(),
        }
    }
}
