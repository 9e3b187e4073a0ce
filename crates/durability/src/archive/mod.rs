//! Compressed tar archive output
//!
//! A backup is a single `.tar.zst` stream:
//!
//! ```text
//! <prefix>-<root>-<YYYY-mm-dd_HH-MM-SS>Z.tar.zst
//! └── <root>/
//!     ├── conf/...
//!     └── data/...
//! ```
//!
//! Every entry's path is the source root's final component joined with the
//! entry's path relative to the root. Directories are stored on their own,
//! symlinks as links, and filtered files with their real metadata but the
//! filtered length.

pub mod types;
pub mod writer;

pub use types::{xxh3_hex, ArchiveEntry, EntryKind, Payload, ARCHIVE_EXTENSION, TEMP_SUFFIX};
pub use writer::{ArchiveWriter, HashingWriter, PayloadSource};
