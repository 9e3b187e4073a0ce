//! ArgMatches → CliAction conversion.
//!
//! Settings are layered: built-in defaults, then the `--config` file, then
//! command-line flags.

use std::path::PathBuf;

use clap::ArgMatches;
use wikivault_durability::{BackupConfig, BackupResult};

use crate::format::OutputMode;

/// What the user asked for
#[derive(Debug)]
pub enum CliAction {
    /// Print the default TOML config and exit
    PrintConfig,
    /// Run a backup
    Backup {
        /// Merged settings, not yet validated
        config: BackupConfig,
        /// Wiki root as given on the command line
        root: PathBuf,
        /// Report format
        mode: OutputMode,
    },
}

/// Translate parsed arguments into an action.
///
/// Fails only when the `--config` file cannot be read or parsed.
pub fn matches_to_action(matches: &ArgMatches) -> BackupResult<CliAction> {
    if matches.get_flag("print-config") {
        return Ok(CliAction::PrintConfig);
    }

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => BackupConfig::load(path)?,
        None => BackupConfig::default(),
    };

    if let Some(template) = matches.get_one::<String>("output-dir") {
        config = config.with_output_dir(template.clone());
    }
    if let Some(prefix) = matches.get_one::<String>("name-prefix") {
        config = config.with_name_prefix(prefix.clone());
    }
    if matches.get_flag("keep-users") {
        config = config.with_exclude_users(false);
    }
    if matches.get_flag("keep-ips") {
        config = config.with_strip_ips(false);
    }
    if let Some(level) = matches.get_one::<i32>("compression-level") {
        config = config.with_compression_level(*level);
    }

    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_default();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    Ok(CliAction::Backup { config, root, mode })
}
