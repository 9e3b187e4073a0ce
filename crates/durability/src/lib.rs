//! Backup layer for wikivault
//!
//! This crate handles everything that touches disk:
//!
//! - Tree walk: depth-first, file-name order, excluded subtrees pruned
//! - Content filters: change-log and page-metadata IP redaction, user file stub
//! - Archive writer: streaming tar + zstd with real entry metadata
//! - Orchestrator: temp-file output, fsync, atomic rename, run report
//! - Configuration: TOML file plus command-line overrides

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive; // Compressed tar output
pub mod backup; // Run orchestration, config and naming
pub mod error; // BackupError taxonomy
pub mod filter; // Content rewrites for redacted files
pub mod policy; // What gets stripped
pub mod walk; // Tree walk and entry classification

// === Re-exports ===
pub use archive::{ArchiveEntry, ArchiveWriter, EntryKind, HashingWriter, Payload};
pub use backup::{BackupConfig, BackupJob, BackupPhase, BackupReport, BackupRunner};
pub use error::{BackupError, BackupResult};
pub use filter::{ContentFilter, FilterError, FilterResult};
pub use policy::{RedactionPolicy, DEFAULT_SENTINEL, LOOPBACK_IP};
pub use walk::{classify, EntryClass, TreeWalker};
