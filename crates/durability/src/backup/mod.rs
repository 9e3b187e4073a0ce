//! Backup orchestrator
//!
//! Drives one run through `Init → Walking → Finalizing → Done`, with a
//! transition to `Failed` from any state.
//!
//! # Crash Safety
//!
//! The archive is published with the write-fsync-rename pattern:
//! 1. Stream every entry into `<name>.tmp` in the output directory
//! 2. Finish the zstd frame and fsync the temporary file
//! 3. Rename to the final name (the only publish point)
//! 4. fsync the output directory
//!
//! A run that fails or is cancelled before step 3 never leaves a file at the
//! final name. The temporary file is left in place for the operator.

pub mod config;
pub mod naming;

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveEntry, ArchiveWriter, EntryKind, HashingWriter};
use crate::error::{BackupError, BackupResult};
use crate::walk::TreeWalker;

pub use config::{BackupConfig, BackupJob};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPhase {
    /// Resolving names and opening the temporary file
    Init,
    /// Walking the tree and writing entries
    Walking,
    /// Closing the stream and publishing the archive
    Finalizing,
    /// Archive published
    Done,
    /// Run aborted; no archive published
    Failed,
}

impl BackupPhase {
    /// Lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupPhase::Init => "init",
            BackupPhase::Walking => "walking",
            BackupPhase::Finalizing => "finalizing",
            BackupPhase::Done => "done",
            BackupPhase::Failed => "failed",
        }
    }

    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, BackupPhase::Done | BackupPhase::Failed)
    }
}

impl fmt::Display for BackupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a published archive
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    /// Path of the published archive
    pub path: PathBuf,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Directory entries written, including the root
    pub directories: u64,
    /// Regular files streamed unmodified
    pub passthrough_files: u64,
    /// Regular files whose content was replaced
    pub filtered_files: u64,
    /// Symlinks recorded as links
    pub symlinks: u64,
    /// FIFOs and device nodes recorded header-only
    pub special_files: u64,
    /// Subtrees left out of the archive
    pub excluded_subtrees: u64,
    /// Uncompressed content bytes written
    pub payload_bytes: u64,
    /// Size of the compressed archive
    pub archive_bytes: u64,
    /// xxh3 of the compressed archive bytes
    pub checksum: String,
    /// Wall time of the run in milliseconds
    pub elapsed_ms: u64,
}

impl BackupReport {
    /// Total number of archive entries
    pub fn entries(&self) -> u64 {
        self.directories
            + self.passthrough_files
            + self.filtered_files
            + self.symlinks
            + self.special_files
    }

    fn record(&mut self, entry: &ArchiveEntry) {
        match entry.kind {
            EntryKind::Directory => self.directories += 1,
            EntryKind::Symlink => self.symlinks += 1,
            EntryKind::Special => self.special_files += 1,
            EntryKind::File if entry.is_filtered() => self.filtered_files += 1,
            EntryKind::File => self.passthrough_files += 1,
        }
        self.payload_bytes += entry.len();
    }
}

impl fmt::Display for BackupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "archive:   {}", self.path.display())?;
        writeln!(
            f,
            "entries:   {} ({} dirs, {} files, {} filtered, {} links, {} special)",
            self.entries(),
            self.directories,
            self.passthrough_files,
            self.filtered_files,
            self.symlinks,
            self.special_files
        )?;
        writeln!(f, "excluded:  {} subtrees", self.excluded_subtrees)?;
        writeln!(
            f,
            "size:      {} bytes ({} bytes uncompressed)",
            self.archive_bytes, self.payload_bytes
        )?;
        write!(f, "checksum:  xxh3:{}", self.checksum)
    }
}

/// Runs one backup job
pub struct BackupRunner {
    job: BackupJob,
    phase: BackupPhase,
    cancel: Option<Arc<AtomicBool>>,
}

impl BackupRunner {
    /// Create a runner in the `Init` phase
    pub fn new(job: BackupJob) -> Self {
        Self {
            job,
            phase: BackupPhase::Init,
            cancel: None,
        }
    }

    /// Abort the walk once `flag` is set
    ///
    /// The flag is checked before each entry is read.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Current phase
    pub fn phase(&self) -> BackupPhase {
        self.phase
    }

    /// Run the backup to completion
    ///
    /// A runner runs once; calling this again after a terminal phase is a
    /// config error.
    pub fn run(&mut self) -> BackupResult<BackupReport> {
        if self.phase != BackupPhase::Init {
            return Err(BackupError::config(format!(
                "backup runner already used (phase {})",
                self.phase
            )));
        }

        let mut temp_path = None;
        let result = self.execute(&mut temp_path);
        match &result {
            Ok(report) => {
                self.transition(BackupPhase::Done);
                info!(
                    path = %report.path.display(),
                    entries = report.entries(),
                    archive_bytes = report.archive_bytes,
                    checksum = %report.checksum,
                    "Backup complete"
                );
            }
            Err(e) => {
                self.transition(BackupPhase::Failed);
                match &temp_path {
                    Some(path) => {
                        warn!(error = %e, temp = %path.display(), "Backup failed, temporary file left in place")
                    }
                    None => warn!(error = %e, "Backup failed"),
                }
            }
        }
        result
    }

    fn execute(&mut self, temp_slot: &mut Option<PathBuf>) -> BackupResult<BackupReport> {
        let clock = Instant::now();

        // === Init ===
        let output_dir = self.job.output_dir()?;
        fs::create_dir_all(&output_dir).map_err(|e| BackupError::write(&output_dir, e))?;

        let final_name = self.job.archive_file_name();
        let final_path = output_dir.join(&final_name);
        let temp_path = output_dir.join(naming::temp_file_name(&final_name));
        if final_path.exists() {
            return Err(BackupError::write(
                &final_path,
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "archive already exists"),
            ));
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| BackupError::write(&temp_path, e))?;
        *temp_slot = Some(temp_path.clone());
        debug!(temp = %temp_path.display(), "Opened temporary archive");

        // === Walking ===
        self.transition(BackupPhase::Walking);
        let policy = self.job.policy();
        let sink = HashingWriter::new(BufWriter::new(file));
        let mut writer = ArchiveWriter::new(sink, self.job.config().compression_level, &temp_path)?;
        let mut walker = TreeWalker::new(self.job.source_root(), self.job.root_name(), &policy);

        let mut report = BackupReport {
            path: final_path.clone(),
            started_at: self.job.started_at(),
            directories: 0,
            passthrough_files: 0,
            filtered_files: 0,
            symlinks: 0,
            special_files: 0,
            excluded_subtrees: 0,
            payload_bytes: 0,
            archive_bytes: 0,
            checksum: String::new(),
            elapsed_ms: 0,
        };

        loop {
            self.check_cancelled()?;
            let entry = match walker.next() {
                Some(entry) => entry?,
                None => break,
            };
            writer.add_entry(&entry)?;
            report.record(&entry);
        }
        report.excluded_subtrees = walker.excluded();

        // === Finalizing ===
        self.transition(BackupPhase::Finalizing);
        let sink = writer.finish()?;
        report.checksum = sink.checksum();
        report.archive_bytes = sink.bytes_written();
        let file = sink
            .into_inner()
            .into_inner()
            .map_err(|e| BackupError::write(&temp_path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| BackupError::write(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &final_path).map_err(|source| BackupError::Publish {
            from: temp_path.clone(),
            to: final_path.clone(),
            source,
        })?;
        *temp_slot = None;
        sync_dir(&output_dir);

        report.elapsed_ms = clock.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn check_cancelled(&self) -> BackupResult<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(BackupError::Cancelled),
            _ => Ok(()),
        }
    }

    fn transition(&mut self, next: BackupPhase) {
        info!(from = %self.phase, to = %next, "Backup phase");
        self.phase = next;
    }
}

/// Best-effort fsync of a directory after a rename into it
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        warn!(dir = %dir.display(), error = %e, "Failed to sync output directory");
    }
}
