//! Streaming archive writer
//!
//! Wraps a single zstd-compressed tar stream opened once per run. Entries are
//! appended strictly in the order they are handed in; nothing is buffered
//! beyond what tar and zstd need.
//!
//! Headers are always built from the real entry's metadata (mode, mtime,
//! uid/gid), so a file whose content was replaced keeps its attributes. Only
//! the size field is taken from the payload.

use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tar::{Builder, Header, HeaderMode};
use xxhash_rust::xxh3::Xxh3;

use crate::archive::types::{ArchiveEntry, EntryKind, Payload};
use crate::error::{BackupError, BackupResult};

/// Content handed to [`ArchiveWriter::add_file`]
#[derive(Debug, Clone, Copy)]
pub enum PayloadSource<'a> {
    /// Stream this file from disk
    File(&'a Path),
    /// Write these in-memory bytes
    Bytes(&'a [u8]),
}

/// Writer for compressed tar archives
pub struct ArchiveWriter<W: Write> {
    builder: Builder<zstd::Encoder<'static, W>>,
    output: PathBuf,
}

impl<W: Write> ArchiveWriter<W> {
    /// Start a compressed archive on `sink`
    ///
    /// `output` names the sink in error messages.
    pub fn new(sink: W, compression_level: i32, output: impl Into<PathBuf>) -> BackupResult<Self> {
        let output = output.into();
        let encoder = zstd::Encoder::new(sink, compression_level)
            .map_err(|e| BackupError::write(&output, e))?;
        Ok(Self {
            builder: Builder::new(encoder),
            output,
        })
    }

    /// Append one walked entry
    pub fn add_entry(&mut self, entry: &ArchiveEntry) -> BackupResult<()> {
        match entry.kind {
            EntryKind::Directory => self.add_directory(&entry.archive_path, &entry.metadata),
            EntryKind::Symlink => {
                self.add_symlink(&entry.archive_path, &entry.source_path, &entry.metadata)
            }
            EntryKind::Special => self.add_header_only(&entry.archive_path, &entry.metadata),
            EntryKind::File => {
                let source = match &entry.payload {
                    Payload::Source => PayloadSource::File(&entry.source_path),
                    Payload::Filtered(data) => PayloadSource::Bytes(data),
                };
                self.add_file(&entry.archive_path, &entry.metadata, entry.len(), source)
            }
        }
    }

    /// Append a directory entry (the directory itself, not its children)
    pub fn add_directory(&mut self, archive_path: &Path, metadata: &Metadata) -> BackupResult<()> {
        self.add_header_only(archive_path, metadata)
    }

    /// Append a regular file of exactly `len` content bytes
    ///
    /// A streamed source that turns out shorter than `len` is a walk error;
    /// bytes beyond `len` are not archived.
    pub fn add_file(
        &mut self,
        archive_path: &Path,
        metadata: &Metadata,
        len: u64,
        source: PayloadSource<'_>,
    ) -> BackupResult<()> {
        let mut header = header_for(metadata);
        header.set_size(len);

        match source {
            PayloadSource::Bytes(data) => self
                .builder
                .append_data(&mut header, archive_path, data)
                .map_err(|e| BackupError::write(&self.output, e)),
            PayloadSource::File(path) => {
                let file = File::open(path).map_err(|e| BackupError::walk(path, e))?;
                let mut reader = SourceReader::new(file, len);
                match self.builder.append_data(&mut header, archive_path, &mut reader) {
                    Ok(()) => Ok(()),
                    Err(e) if reader.failed => Err(BackupError::walk(path, e)),
                    Err(e) => Err(BackupError::write(&self.output, e)),
                }
            }
        }
    }

    /// Append a symlink entry pointing where `source` points
    pub fn add_symlink(
        &mut self,
        archive_path: &Path,
        source: &Path,
        metadata: &Metadata,
    ) -> BackupResult<()> {
        let target = fs::read_link(source).map_err(|e| BackupError::walk(source, e))?;
        let mut header = header_for(metadata);
        header.set_size(0);
        self.builder
            .append_link(&mut header, archive_path, &target)
            .map_err(|e| BackupError::write(&self.output, e))
    }

    fn add_header_only(&mut self, archive_path: &Path, metadata: &Metadata) -> BackupResult<()> {
        let mut header = header_for(metadata);
        header.set_size(0);
        self.builder
            .append_data(&mut header, archive_path, io::empty())
            .map_err(|e| BackupError::write(&self.output, e))
    }

    /// Write the tar trailer, finish the zstd frame and hand back the sink
    ///
    /// Dropping the writer without calling this leaves an incomplete stream.
    pub fn finish(self) -> BackupResult<W> {
        let ArchiveWriter { builder, output } = self;
        let encoder = builder
            .into_inner()
            .map_err(|e| BackupError::write(&output, e))?;
        encoder.finish().map_err(|e| BackupError::write(&output, e))
    }
}

fn header_for(metadata: &Metadata) -> Header {
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(metadata, HeaderMode::Complete);
    header
}

/// Reads at most `remaining` bytes and fails if the file ends first
///
/// Remembers whether a failure came from the source side so the caller can
/// tell a vanished source from a broken output stream.
struct SourceReader<R> {
    inner: R,
    remaining: u64,
    failed: bool,
}

impl<R: Read> SourceReader<R> {
    fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            remaining: len,
            failed: false,
        }
    }
}

impl<R: Read> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = match self.inner.read(&mut buf[..max]) {
            Ok(0) if max > 0 => {
                self.failed = true;
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file shrank while archiving ({} bytes missing)", self.remaining),
                ));
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(e),
            Err(e) => {
                self.failed = true;
                return Err(e);
            }
        };
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// Write adapter that hashes and counts everything passing through
pub struct HashingWriter<W> {
    inner: W,
    hasher: Xxh3,
    written: u64,
}

impl<W: Write> HashingWriter<W> {
    /// Wrap `inner`
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Xxh3::new(),
            written: 0,
        }
    }

    /// xxh3 of everything written so far, as 16 hex digits
    pub fn checksum(&self) -> String {
        format!("{:016x}", self.hasher.digest())
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
