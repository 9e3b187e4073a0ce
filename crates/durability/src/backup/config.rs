//! Backup configuration via TOML
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid starting point. Command-line flags are applied on top with the
//! `with_*` setters and the result is checked once by [`BackupConfig::validate`].

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::naming;
use crate::error::{BackupError, BackupResult};
use crate::policy::{RedactionPolicy, DEFAULT_SENTINEL};

/// Default zstd level: the highest-ratio setting in the normal range
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 19;

/// Lowest accepted zstd level
pub const MIN_COMPRESSION_LEVEL: i32 = 1;

/// Highest accepted zstd level
pub const MAX_COMPRESSION_LEVEL: i32 = 22;

/// Backup settings loaded from a config file and the command line
///
/// # Example
///
/// ```toml
/// output_dir = "/var/backups/wiki/%Y-%m"
/// name_prefix = "nightly"
/// exclude_users = true
/// strip_ips = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupConfig {
    /// Destination directory, expanded with strftime at run start (UTC)
    #[serde(default)]
    pub output_dir: String,
    /// Optional prefix for the archive file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    /// Replace `conf/users.auth.php` with an empty user list
    #[serde(default = "default_true")]
    pub exclude_users: bool,
    /// Replace IPs in change logs and page metadata
    #[serde(default = "default_true")]
    pub strip_ips: bool,
    /// zstd compression level
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
    /// Value written in place of a stripped IP
    #[serde(default = "default_sentinel")]
    pub redaction_sentinel: String,
}

fn default_true() -> bool {
    true
}

fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            name_prefix: None,
            exclude_users: default_true(),
            strip_ips: default_true(),
            compression_level: default_compression_level(),
            redaction_sentinel: default_sentinel(),
        }
    }
}

impl BackupConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> BackupResult<Self> {
        toml::from_str(content)
            .map_err(|e| BackupError::config(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> BackupResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BackupError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            BackupError::Config(msg) => {
                BackupError::config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Set the output directory template
    pub fn with_output_dir(mut self, template: impl Into<String>) -> Self {
        self.output_dir = template.into();
        self
    }

    /// Set the archive name prefix
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Set whether the user file is replaced
    pub fn with_exclude_users(mut self, exclude: bool) -> Self {
        self.exclude_users = exclude;
        self
    }

    /// Set whether IPs are stripped
    pub fn with_strip_ips(mut self, strip: bool) -> Self {
        self.strip_ips = strip;
        self
    }

    /// Set the zstd level
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Set the redaction sentinel
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.redaction_sentinel = sentinel.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> BackupResult<()> {
        naming::validate_template(&self.output_dir)?;

        if let Some(prefix) = &self.name_prefix {
            if prefix.contains('/') || prefix.contains('\0') {
                return Err(BackupError::config(format!(
                    "name prefix '{}' must not contain path separators",
                    prefix
                )));
            }
        }

        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&self.compression_level) {
            return Err(BackupError::config(format!(
                "compression level {} out of range {}..={}",
                self.compression_level, MIN_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL
            )));
        }

        // The sentinel is spliced into tab-separated log lines
        if self.redaction_sentinel.contains(['\t', '\n', '\r']) {
            return Err(BackupError::config(
                "redaction sentinel must not contain tabs or line breaks",
            ));
        }
        Ok(())
    }

    /// Redaction policy for this configuration
    pub fn policy(&self) -> RedactionPolicy {
        RedactionPolicy {
            strip_ips: self.strip_ips,
            exclude_users: self.exclude_users,
            sentinel: self.redaction_sentinel.clone(),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# wikivault backup configuration
#
# Destination directory. Expanded with strftime at run start, in UTC.
# Required here or via --output-dir.
# output_dir = "/var/backups/wiki/%Y-%m"

# Optional archive name prefix: <prefix>-<wiki>-<timestamp>Z.tar.zst
# name_prefix = "nightly"

# Replace conf/users.auth.php with an empty user list (default: true)
exclude_users = true

# Replace IP addresses in *.changes and *.meta under data/ (default: true)
strip_ips = true

# zstd compression level, 1..=22 (default: 19)
compression_level = 19

# Value written in place of a stripped IP (default: "redacted-ip")
redaction_sentinel = "redacted-ip"
"#
    }
}

/// One backup run: validated config, resolved source root and start time
///
/// Built once before the run and never changed afterwards.
#[derive(Debug, Clone)]
pub struct BackupJob {
    config: BackupConfig,
    source_root: PathBuf,
    root_name: OsString,
    started_at: DateTime<Utc>,
}

impl BackupJob {
    /// Validate `config` and `source_root` and stamp the run with the current time
    pub fn new(config: BackupConfig, source_root: impl AsRef<Path>) -> BackupResult<Self> {
        Self::at(config, source_root, Utc::now())
    }

    /// Like [`BackupJob::new`] with an explicit start time
    ///
    /// An output directory at or below the source root is a config error.
    pub fn at(
        config: BackupConfig,
        source_root: impl AsRef<Path>,
        started_at: DateTime<Utc>,
    ) -> BackupResult<Self> {
        config.validate()?;
        let source_root = resolve_source_root(source_root.as_ref())?;
        let root_name = source_root
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| {
                BackupError::config(format!(
                    "source root '{}' has no directory name",
                    source_root.display()
                ))
            })?;

        let output_dir = anchor_output_dir(&naming::format_output_dir(
            &config.output_dir,
            &started_at,
        )?)?;
        if output_dir.starts_with(&source_root) {
            return Err(BackupError::config(format!(
                "output directory '{}' lies inside source root '{}'",
                output_dir.display(),
                source_root.display()
            )));
        }

        Ok(Self {
            config,
            source_root,
            root_name,
            started_at,
        })
    }

    /// The validated configuration
    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Absolute path of the tree being archived
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Final component of the source root; every archive path starts with it
    pub fn root_name(&self) -> &Path {
        Path::new(&self.root_name)
    }

    /// When the run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Output directory with the template expanded
    pub fn output_dir(&self) -> BackupResult<PathBuf> {
        naming::format_output_dir(&self.config.output_dir, &self.started_at)
    }

    /// File name of the published archive
    pub fn archive_file_name(&self) -> String {
        naming::archive_file_name(
            self.config.name_prefix.as_deref(),
            &self.root_name.to_string_lossy(),
            &self.started_at,
        )
    }

    /// Redaction policy for this run
    pub fn policy(&self) -> RedactionPolicy {
        self.config.policy()
    }
}

fn resolve_source_root(path: &Path) -> BackupResult<PathBuf> {
    let resolved = fs::canonicalize(path).map_err(|e| {
        BackupError::config(format!("source root '{}': {}", path.display(), e))
    })?;
    if !resolved.is_dir() {
        return Err(BackupError::config(format!(
            "source root '{}' is not a directory",
            path.display()
        )));
    }
    Ok(resolved)
}

/// Absolute form of an output directory that may not exist yet
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged.
fn anchor_output_dir(dir: &Path) -> BackupResult<PathBuf> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| {
                BackupError::config(format!("output directory '{}': {}", dir.display(), e))
            })?
            .join(dir)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(existing) {
            return Ok(missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, name| acc.join(name)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}
