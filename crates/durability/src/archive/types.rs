//! Archive entry types

use std::fs::Metadata;
use std::path::PathBuf;

/// File extension for backup archives
pub const ARCHIVE_EXTENSION: &str = ".tar.zst";

/// Suffix appended to the archive name while it is being written
pub const TEMP_SUFFIX: &str = ".tmp";

/// What kind of filesystem object an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory, recorded on its own (children are separate entries)
    Directory,
    /// Regular file
    File,
    /// Symbolic link, recorded as a link and never followed
    Symlink,
    /// FIFO or device node, header only
    Special,
}

impl EntryKind {
    /// Classify from `symlink_metadata` of the source
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let ft = metadata.file_type();
        if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Special
        }
    }
}

/// Where an entry's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Stream the source file's real bytes
    Source,
    /// Write these already-filtered bytes instead
    Filtered(Vec<u8>),
}

/// One item destined for the archive
///
/// Built by the tree walker, consumed once by the archive writer.
#[derive(Debug)]
pub struct ArchiveEntry {
    /// Path inside the archive: `<root name>/<path relative to root>`
    pub archive_path: PathBuf,
    /// Path of the real filesystem entry
    pub source_path: PathBuf,
    /// Kind of filesystem object
    pub kind: EntryKind,
    /// Metadata of the real entry (mode, mtime, ownership)
    ///
    /// Always taken from disk, even when the content is replaced.
    pub metadata: Metadata,
    /// Content source
    pub payload: Payload,
}

impl ArchiveEntry {
    /// Number of content bytes this entry will write
    pub fn len(&self) -> u64 {
        match (&self.payload, self.kind) {
            (Payload::Filtered(data), _) => data.len() as u64,
            (Payload::Source, EntryKind::File) => self.metadata.len(),
            (Payload::Source, _) => 0,
        }
    }

    /// Whether the entry writes no content bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the content was rewritten by a filter
    pub fn is_filtered(&self) -> bool {
        matches!(self.payload, Payload::Filtered(_))
    }
}

/// Compute the xxh3 hex checksum of a byte slice
pub fn xxh3_hex(data: &[u8]) -> String {
    use xxhash_rust::xxh3::xxh3_64;
    format!("{:016x}", xxh3_64(data))
}
