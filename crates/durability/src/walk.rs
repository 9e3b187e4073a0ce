//! Tree walker and entry classifier
//!
//! Walks the source root depth-first in file-name order, parents before
//! children, and turns every filesystem entry into an [`ArchiveEntry`].
//!
//! # Classification
//!
//! Rules are checked in this order against the path relative to the root:
//!
//! 1. `data/cache`, `data/index`, `data/locks`: skipped together with
//!    everything below them; no entry at all.
//! 2. Directories, symlinks and special files: recorded as-is.
//! 3. With IP stripping on, `*.changes` and `*.meta` anywhere under `data/`:
//!    content rewritten by the matching redactor.
//! 4. With user exclusion on, `conf/users.auth.php`: replaced by an empty
//!    user list.
//! 5. Everything else: streamed unmodified.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::archive::{ArchiveEntry, EntryKind, Payload};
use crate::error::{BackupError, BackupResult};
use crate::filter::ContentFilter;
use crate::policy::RedactionPolicy;

/// Subtrees that are never archived
pub const EXCLUDED_SUBTREES: [&str; 3] = ["data/cache", "data/index", "data/locks"];

/// Subtree whose logs and metadata carry IP addresses
pub const DATA_DIR: &str = "data";

/// The user credential file
pub const USERS_FILE: &str = "conf/users.auth.php";

/// How one entry goes into the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Skip this entry and everything below it
    Exclude,
    /// Directory, symlink or special file, recorded unmodified
    Node,
    /// Regular file whose content is rewritten
    Filtered(ContentFilter),
    /// Regular file streamed unmodified
    Passthrough,
}

/// Classify an entry by its path relative to the source root
pub fn classify(relative: &Path, kind: EntryKind, policy: &RedactionPolicy) -> EntryClass {
    if EXCLUDED_SUBTREES
        .iter()
        .any(|excluded| relative == Path::new(excluded))
    {
        return EntryClass::Exclude;
    }
    if kind != EntryKind::File {
        return EntryClass::Node;
    }

    if policy.strip_ips && relative.starts_with(DATA_DIR) {
        match relative.extension().and_then(|ext| ext.to_str()) {
            Some("changes") => return EntryClass::Filtered(ContentFilter::RedactChangesLog),
            Some("meta") => return EntryClass::Filtered(ContentFilter::RedactMetadata),
            _ => {}
        }
    }

    if policy.exclude_users && relative == Path::new(USERS_FILE) {
        return EntryClass::Filtered(ContentFilter::EmptyUserList);
    }

    EntryClass::Passthrough
}

/// Iterator over the archive entries of a source tree
///
/// Filters run as entries are produced, so at most one filtered file is
/// held in memory at a time.
pub struct TreeWalker<'a> {
    inner: walkdir::IntoIter,
    root: PathBuf,
    root_name: PathBuf,
    policy: &'a RedactionPolicy,
    excluded: u64,
}

impl<'a> TreeWalker<'a> {
    /// Walk `root`, naming entries `<root_name>/<relative path>`
    pub fn new(root: &Path, root_name: impl Into<PathBuf>, policy: &'a RedactionPolicy) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self {
            inner,
            root: root.to_path_buf(),
            root_name: root_name.into(),
            policy,
            excluded: 0,
        }
    }

    /// Number of subtrees skipped so far
    pub fn excluded(&self) -> u64 {
        self.excluded
    }

    fn build_entry(&mut self, dent: walkdir::DirEntry) -> BackupResult<Option<ArchiveEntry>> {
        let source_path = dent.path().to_path_buf();
        let relative = source_path
            .strip_prefix(&self.root)
            .map_err(|_| {
                BackupError::walk(
                    &source_path,
                    std::io::Error::new(std::io::ErrorKind::Other, "entry outside source root"),
                )
            })?
            .to_path_buf();
        let metadata = dent
            .metadata()
            .map_err(|e| BackupError::walk(&source_path, e.into()))?;
        let kind = EntryKind::from_metadata(&metadata);

        let payload = match classify(&relative, kind, self.policy) {
            EntryClass::Exclude => {
                if kind == EntryKind::Directory {
                    self.inner.skip_current_dir();
                }
                self.excluded += 1;
                debug!(path = %relative.display(), "Excluded subtree");
                return Ok(None);
            }
            EntryClass::Filtered(filter) => {
                let data = filter
                    .apply(&source_path, self.policy)
                    .map_err(|e| BackupError::from_filter(&source_path, e))?;
                debug!(
                    path = %relative.display(),
                    filter = filter.name(),
                    original = metadata.len(),
                    filtered = data.len(),
                    "Filtered file"
                );
                Payload::Filtered(data)
            }
            EntryClass::Node | EntryClass::Passthrough => {
                trace!(path = %relative.display(), ?kind, "Passthrough entry");
                Payload::Source
            }
        };

        let archive_path = if relative.as_os_str().is_empty() {
            self.root_name.clone()
        } else {
            self.root_name.join(&relative)
        };
        Ok(Some(ArchiveEntry {
            archive_path,
            source_path,
            kind,
            metadata,
            payload,
        }))
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = BackupResult<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let dent = match self.inner.next()? {
                Ok(dent) => dent,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(BackupError::walk(path, e.into())));
                }
            };
            match self.build_entry(dent) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
