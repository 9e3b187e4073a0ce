//! Backup error types
//!
//! Nothing is recovered locally: every variant aborts the whole run. The
//! path-bearing variants name the offending path so the operator can find it.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wikivault_core::DecodeError;

use crate::filter::FilterError;

/// Errors that can occur during a backup run
#[derive(Debug, Error)]
pub enum BackupError {
    /// Invalid or missing configuration, caught before the run starts
    #[error("Config error: {0}")]
    Config(String),

    /// A source entry disappeared or became unreadable mid-walk
    #[error("Walk error at {path}: {source}")]
    Walk {
        /// Source path being visited
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A metadata file is not valid serialized data
    #[error("Decode error in {path}: {source}")]
    Decode {
        /// Source file that failed to decode
        path: PathBuf,
        /// Codec error with offset and cause
        source: DecodeError,
    },

    /// A log or metadata record could not be filtered
    #[error("Filter error in {path}: {reason}")]
    Filter {
        /// Source file being filtered
        path: PathBuf,
        /// What was wrong with the record
        reason: String,
    },

    /// I/O failure on the output side (directory, temp file, compressed stream)
    #[error("Write error at {path}: {source}")]
    Write {
        /// Output path being written
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Renaming the finished temp file into place failed
    #[error("Publish error renaming {from} to {to}: {source}")]
    Publish {
        /// Temporary archive path
        from: PathBuf,
        /// Final archive path
        to: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The run was cancelled between walk steps
    #[error("Backup cancelled")]
    Cancelled,
}

impl BackupError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a walk error
    pub fn walk(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Walk {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a write error
    pub fn write(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach a source path to a filter failure
    ///
    /// Decode failures and read failures keep their own taxonomy entries
    /// (`Decode`, `Walk`); only malformed records become `Filter`.
    pub fn from_filter(path: impl AsRef<Path>, err: FilterError) -> Self {
        let path = path.as_ref().to_path_buf();
        match err {
            FilterError::Decode(source) => Self::Decode { path, source },
            FilterError::Io(source) => Self::Walk { path, source },
            malformed @ FilterError::MalformedRecord { .. } => Self::Filter {
                path,
                reason: malformed.to_string(),
            },
        }
    }

    /// Whether this error was raised before any output was produced
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type for backup operations
pub type BackupResult<T> = Result<T, BackupError>;
