//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use wikivault::{BackupConfig, BackupJob};

// ============================================================================
// Fixture wiki
// ============================================================================

pub const CHANGES: &str = "1609459200\t192.0.2.7\tC\tstart\talice\tcreated\n\
1609462800\t2001:db8::1\tE\tstart\tbob\tfix typo\n";

pub const CHANGES_REDACTED: &str = "1609459200\tredacted-ip\tC\tstart\talice\tcreated\n\
1609462800\tredacted-ip\tE\tstart\tbob\tfix typo\n";

pub const USERS: &str = "# users.auth.php\n\
alice:$2y$10$abcdefghijklmnopqrstuv:Alice:alice@example.org:admin,user\n";

pub const PAGE: &str = "====== Start ======\n\nWelcome to the wiki.\n";

/// Page metadata with `last_change.ip` set in both snapshots
pub fn meta(ip: &str) -> String {
    format!(
        "a:2:{{s:7:\"current\";a:3:{{s:4:\"date\";a:2:{{s:7:\"created\";i:1609459200;s:8:\"modified\";i:1609462800;}}s:5:\"title\";s:5:\"Start\";s:11:\"last_change\";a:4:{{s:4:\"date\";i:1609462800;s:2:\"ip\";s:{len}:\"{ip}\";s:4:\"type\";s:1:\"E\";s:4:\"user\";s:3:\"bob\";}}}}s:10:\"persistent\";a:1:{{s:11:\"last_change\";a:1:{{s:2:\"ip\";s:{len}:\"{ip}\";}}}}}}",
        len = ip.len(),
        ip = ip
    )
}

/// A temp dir holding a small wiki at `<tmp>/wiki` and an output area
pub struct Fixture {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl Fixture {
    /// Minimal wiki: one change log, one metadata file, the user file,
    /// one page, and cache/index/locks content that must not be archived.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("wiki");
        let f = Fixture { dir, root };

        f.write("conf/users.auth.php", USERS.as_bytes());
        f.write("conf/local.php", b"<?php\n$conf['title'] = 'Test';\n");
        f.write("data/pages/start.txt", PAGE.as_bytes());
        f.write("data/meta/start.changes", CHANGES.as_bytes());
        f.write("data/meta/start.meta", meta("192.0.2.7").as_bytes());
        f.write("data/cache/a/abc.xhtml", b"<p>cached</p>");
        f.write("data/index/page.idx", b"start\n");
        f.write("data/locks/start.lock", b"alice");
        f
    }

    /// Write `content` at `relative` under the wiki root, creating parents
    pub fn write(&self, relative: &str, content: &[u8]) {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Output directory used by [`Fixture::config`]
    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Config writing into `out/` with a fast compression level
    pub fn config(&self) -> BackupConfig {
        BackupConfig::default()
            .with_output_dir(self.out_dir().to_string_lossy().to_string())
            .with_compression_level(3)
    }

    /// Job stamped at [`run_time`]
    pub fn job(&self, config: BackupConfig) -> BackupJob {
        BackupJob::at(config, &self.root, run_time()).unwrap()
    }

    /// Final archive path for an unprefixed run at [`run_time`]
    pub fn final_path(&self) -> PathBuf {
        self.out_dir().join("wiki-2024-05-06_07-08-09Z.tar.zst")
    }

    /// Temporary archive path for an unprefixed run at [`run_time`]
    pub fn temp_path(&self) -> PathBuf {
        self.out_dir().join("wiki-2024-05-06_07-08-09Z.tar.zst.tmp")
    }
}

/// Fixed start time for deterministic names
pub fn run_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
}

// ============================================================================
// Archive readback
// ============================================================================

/// One entry read back from an archive
#[derive(Debug)]
pub struct ReadEntry {
    pub kind: tar::EntryType,
    pub mode: u32,
    pub mtime: u64,
    pub link: Option<PathBuf>,
    pub data: Vec<u8>,
}

/// Decompress and list an archive, in archive order
pub fn read_archive(path: &Path) -> Vec<(String, ReadEntry)> {
    let compressed = fs::read(path).unwrap();
    let mut tar_bytes = Vec::new();
    zstd::Decoder::new(&compressed[..])
        .unwrap()
        .read_to_end(&mut tar_bytes)
        .unwrap();

    let mut archive = tar::Archive::new(&tar_bytes[..]);
    let mut entries = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().to_string();
        let header = entry.header();
        let kind = header.entry_type();
        let mode = header.mode().unwrap();
        let mtime = header.mtime().unwrap();
        let link = entry.link_name().unwrap().map(|l| l.into_owned());
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.push((
            name.trim_end_matches('/').to_string(),
            ReadEntry {
                kind,
                mode,
                mtime,
                link,
                data,
            },
        ));
    }
    entries
}

/// Archive contents keyed by path
pub fn archive_map(path: &Path) -> BTreeMap<String, ReadEntry> {
    read_archive(path).into_iter().collect()
}
