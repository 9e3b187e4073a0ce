//! wikivault - redacting backups for DokuWiki installations
//!
//! Archives a wiki tree into a single `.tar.zst` file while stripping
//! visitor IP addresses from change logs and page metadata and replacing the
//! user credential file with an empty stub.
//!
//! # Quick Start
//!
//! ```ignore
//! use wikivault::{BackupConfig, BackupJob, BackupRunner};
//!
//! let config = BackupConfig::default().with_output_dir("/var/backups/wiki/%Y-%m");
//! let job = BackupJob::new(config, "/srv/dokuwiki")?;
//! let report = BackupRunner::new(job).run()?;
//! println!("{}", report.path.display());
//! ```
//!
//! # Architecture
//!
//! - `wikivault-core`: the serialized page-metadata value model and codec
//! - `wikivault-durability`: filters, tree walk, archive writer, orchestrator
//!
//! The `wikivault` binary lives in `wikivault-cli`.

pub use wikivault_core::{decode, encode, DecodeError, StructuredValue};
pub use wikivault_durability::*;
