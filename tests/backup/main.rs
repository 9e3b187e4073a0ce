//! Backup End-to-End Test Suite
//!
//! Builds small wiki trees on disk, runs complete backups and reads the
//! archives back.
//!
//! ## Modules
//!
//! - `redaction`: what ends up inside the archive under each policy
//! - `publish`: naming, atomic publish, failure and cancellation behaviour
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test backup
//! cargo test --test backup publish::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod publish;
mod redaction;
