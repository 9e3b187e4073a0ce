//! Naming, atomic publish, failures and cancellation

use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::common::*;
use wikivault::archive::xxh3_hex;
use wikivault::{BackupError, BackupJob, BackupPhase, BackupRunner};

#[test]
fn archive_published_under_final_name() {
    let f = Fixture::new();
    let mut runner = BackupRunner::new(f.job(f.config()));
    let report = runner.run().unwrap();

    assert_eq!(runner.phase(), BackupPhase::Done);
    assert_eq!(report.path, f.final_path());
    assert!(f.final_path().is_file());
    assert!(!f.temp_path().exists());
    assert_eq!(report.started_at, run_time());

    let files: Vec<_> = fs::read_dir(f.out_dir()).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn prefix_and_time_template() {
    let f = Fixture::new();
    let config = f
        .config()
        .with_output_dir(format!("{}/%Y/%m-%d", f.out_dir().display()))
        .with_name_prefix("nightly");
    let report = BackupRunner::new(f.job(config)).run().unwrap();
    assert_eq!(
        report.path,
        f.out_dir()
            .join("2024/05-06/nightly-wiki-2024-05-06_07-08-09Z.tar.zst")
    );
    assert!(report.path.is_file());
}

#[test]
fn report_checksum_matches_file() {
    let f = Fixture::new();
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let bytes = fs::read(&report.path).unwrap();
    assert_eq!(report.archive_bytes, bytes.len() as u64);
    assert_eq!(report.checksum, xxh3_hex(&bytes));
}

#[test]
fn malformed_metadata_fails_without_publishing() {
    let f = Fixture::new();
    f.write("data/meta/broken.meta", b"a:2:{s:7:\"current\";");

    let mut runner = BackupRunner::new(f.job(f.config()));
    let err = runner.run().unwrap_err();
    match &err {
        BackupError::Decode { path, .. } => assert!(path.ends_with("data/meta/broken.meta")),
        other => panic!("unexpected {:?}", other),
    }
    assert!(err.to_string().contains("broken.meta"));
    assert_eq!(runner.phase(), BackupPhase::Failed);
    assert!(!f.final_path().exists());
    assert!(f.temp_path().exists());
}

#[test]
fn malformed_change_log_fails_without_publishing() {
    let f = Fixture::new();
    f.write("data/meta/bad.changes", b"1609459200\t192.0.2.7\tE\tbad\nonly-one-field\n");

    let err = BackupRunner::new(f.job(f.config())).run().unwrap_err();
    match err {
        BackupError::Filter { path, reason } => {
            assert!(path.ends_with("data/meta/bad.changes"));
            assert!(reason.contains("line 2"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!f.final_path().exists());
    assert!(f.temp_path().exists());
}

#[test]
fn malformed_files_pass_through_when_not_filtered() {
    let f = Fixture::new();
    f.write("data/meta/broken.meta", b"not serialized");
    let config = f.config().with_strip_ips(false);
    let report = BackupRunner::new(f.job(config)).run().unwrap();
    let entries = archive_map(&report.path);
    assert_eq!(entries["wiki/data/meta/broken.meta"].data, b"not serialized");
}

#[test]
fn cancellation_leaves_no_final_archive() {
    let f = Fixture::new();
    let cancel = Arc::new(AtomicBool::new(true));
    let mut runner = BackupRunner::new(f.job(f.config())).with_cancel(cancel);

    let err = runner.run().unwrap_err();
    assert!(matches!(err, BackupError::Cancelled));
    assert_eq!(runner.phase(), BackupPhase::Failed);
    assert!(!f.final_path().exists());
    assert!(f.temp_path().exists());
}

#[test]
fn unset_cancel_flag_has_no_effect() {
    let f = Fixture::new();
    let cancel = Arc::new(AtomicBool::new(false));
    let report = BackupRunner::new(f.job(f.config()))
        .with_cancel(cancel)
        .run()
        .unwrap();
    assert!(report.path.is_file());
}

#[test]
fn config_errors_caught_before_any_output() {
    let f = Fixture::new();

    let err = BackupJob::at(f.config(), f.root.join("missing"), run_time()).unwrap_err();
    assert!(err.is_config());

    let err = BackupJob::at(f.config().with_compression_level(40), &f.root, run_time())
        .unwrap_err();
    assert!(err.is_config());

    assert!(!f.out_dir().exists());
}

#[test]
fn output_inside_wiki_root_is_config_error() {
    let f = Fixture::new();
    let config = f
        .config()
        .with_output_dir(format!("{}/data/backups", f.root.display()));

    let err = BackupJob::at(config, &f.root, run_time()).unwrap_err();
    assert!(err.is_config());
    assert!(!f.root.join("data/backups").exists());
}

#[test]
fn archives_are_reproducible_for_same_tree() {
    let f = Fixture::new();
    let first = BackupRunner::new(f.job(f.config())).run().unwrap();
    let first_bytes = fs::read(&first.path).unwrap();
    fs::remove_file(&first.path).unwrap();

    let second = BackupRunner::new(f.job(f.config())).run().unwrap();
    assert_eq!(fs::read(&second.path).unwrap(), first_bytes);
    assert_eq!(second.checksum, first.checksum);
}
