//! wikivault CLI: redacted DokuWiki backups.
//!
//! `wikivault -o /backups/%Y-%m /srv/dokuwiki` writes
//! `/backups/2024-03/dokuwiki-2024-03-09_07-05-01Z.tar.zst`.
//!
//! Exit codes: 0 on success, 1 when the run fails, 2 on usage or
//! configuration errors.

mod commands;
mod format;
mod parse;

use std::process;

use tracing_subscriber::EnvFilter;
use wikivault_durability::{BackupError, BackupJob, BackupRunner};

use commands::build_cli;
use format::{format_error, format_report, OutputMode};
use parse::{matches_to_action, CliAction};

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let json = matches.get_flag("json");
    let (config, root, mode) = match matches_to_action(&matches) {
        Ok(CliAction::PrintConfig) => {
            print!("{}", wikivault_durability::BackupConfig::default_toml());
            return;
        }
        Ok(CliAction::Backup { config, root, mode }) => (config, root, mode),
        Err(e) => exit_with(&e, if json { OutputMode::Json } else { OutputMode::Human }),
    };

    let job = match BackupJob::new(config, &root) {
        Ok(job) => job,
        Err(e) => exit_with(&e, mode),
    };

    let mut runner = BackupRunner::new(job);
    match runner.run() {
        Ok(report) => println!("{}", format_report(&report, mode)),
        Err(e) => exit_with(&e, mode),
    }
}

/// Install the stderr log subscriber.
///
/// `-v`/`-vv` pick the level; otherwise `RUST_LOG` applies, defaulting to warn.
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with(err: &BackupError, mode: OutputMode) -> ! {
    eprintln!("{}", format_error(err, mode));
    process::exit(if err.is_config() {
        EXIT_USAGE
    } else {
        EXIT_FAILURE
    });
}
