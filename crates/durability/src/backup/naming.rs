//! Output directory and archive file naming
//!
//! Every name is derived from the run's single timestamp, so the output
//! directory and the archive name always agree on the time.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::archive::{ARCHIVE_EXTENSION, TEMP_SUFFIX};
use crate::error::{BackupError, BackupResult};

/// Timestamp layout embedded in archive names (always UTC)
pub const NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Check that `template` is a usable strftime format
pub fn validate_template(template: &str) -> BackupResult<()> {
    if template.is_empty() {
        return Err(BackupError::config("output directory template is empty"));
    }
    if StrftimeItems::new(template).any(|item| matches!(item, Item::Error)) {
        return Err(BackupError::config(format!(
            "invalid time format in output directory template '{}'",
            template
        )));
    }
    Ok(())
}

/// Expand the output directory template at `now`
pub fn format_output_dir(template: &str, now: &DateTime<Utc>) -> BackupResult<PathBuf> {
    validate_template(template)?;
    let mut expanded = String::new();
    write!(expanded, "{}", now.format(template)).map_err(|_| {
        BackupError::config(format!(
            "cannot expand output directory template '{}'",
            template
        ))
    })?;
    Ok(PathBuf::from(expanded))
}

/// `[<prefix>-]<root name>-<YYYY-mm-dd_HH-MM-SS>Z.tar.zst`
pub fn archive_file_name(prefix: Option<&str>, root_name: &str, now: &DateTime<Utc>) -> String {
    let stamp = now.format(NAME_TIMESTAMP_FORMAT);
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            format!("{}-{}-{}Z{}", prefix, root_name, stamp, ARCHIVE_EXTENSION)
        }
        _ => format!("{}-{}Z{}", root_name, stamp, ARCHIVE_EXTENSION),
    }
}

/// Name of the in-progress file for `final_name`
pub fn temp_file_name(final_name: &str) -> String {
    format!("{}{}", final_name, TEMP_SUFFIX)
}
