//! Archive contents under each redaction policy

use std::fs;

use crate::common::*;
use wikivault::filter::EMPTY_USERS_AUTH;
use wikivault::{decode, encode, BackupRunner};

#[test]
fn default_policy_redacts_and_keeps_the_rest() {
    let f = Fixture::new();
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);

    assert_eq!(
        entries["wiki/data/meta/start.changes"].data,
        CHANGES_REDACTED.as_bytes()
    );
    assert_eq!(
        entries["wiki/data/meta/start.meta"].data,
        meta("redacted-ip").as_bytes()
    );
    assert_eq!(entries["wiki/conf/users.auth.php"].data, EMPTY_USERS_AUTH);
    assert_eq!(entries["wiki/data/pages/start.txt"].data, PAGE.as_bytes());
    assert_eq!(
        entries["wiki/conf/local.php"].data,
        fs::read(f.root.join("conf/local.php")).unwrap()
    );

    assert_eq!(report.filtered_files, 3);
    assert_eq!(report.passthrough_files, 2);
}

#[test]
fn metadata_structure_survives_redaction() {
    let f = Fixture::new();
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);

    let original = decode(meta("192.0.2.7").as_bytes()).unwrap();
    let archived = decode(&entries["wiki/data/meta/start.meta"].data).unwrap();

    let before = original.get(b"current").unwrap();
    let after = archived.get(b"current").unwrap();
    assert_eq!(after.get(b"date"), before.get(b"date"));
    assert_eq!(after.get(b"title"), before.get(b"title"));
    let change = after.get(b"last_change").unwrap();
    assert_eq!(change.get(b"user"), Some(&"bob".into()));
    assert_eq!(change.get(b"ip"), Some(&"redacted-ip".into()));

    // Re-encoding the archived value is stable
    let bytes = &entries["wiki/data/meta/start.meta"].data;
    assert_eq!(&encode(&archived), bytes);
}

#[test]
fn loopback_ip_is_kept() {
    let f = Fixture::new();
    f.write("data/meta/local.meta", meta("127.0.0.1").as_bytes());
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);
    assert_eq!(
        entries["wiki/data/meta/local.meta"].data,
        meta("127.0.0.1").as_bytes()
    );
}

#[test]
fn excluded_subtrees_have_no_entries() {
    let f = Fixture::new();
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);

    for name in entries.keys() {
        assert!(!name.starts_with("wiki/data/cache"), "{}", name);
        assert!(!name.starts_with("wiki/data/index"), "{}", name);
        assert!(!name.starts_with("wiki/data/locks"), "{}", name);
    }
    assert!(entries.contains_key("wiki/data"));
    assert!(entries.contains_key("wiki/data/pages/start.txt"));
    assert_eq!(report.excluded_subtrees, 3);
}

#[test]
fn keep_users_archives_real_credentials() {
    let f = Fixture::new();
    let config = f.config().with_exclude_users(false);
    let report = BackupRunner::new(f.job(config)).run().unwrap();
    let entries = archive_map(&report.path);

    assert_eq!(entries["wiki/conf/users.auth.php"].data, USERS.as_bytes());
    // IPs are still stripped
    assert_eq!(
        entries["wiki/data/meta/start.changes"].data,
        CHANGES_REDACTED.as_bytes()
    );
}

#[test]
fn stub_ignores_real_credentials() {
    let f = Fixture::new();
    f.write("conf/users.auth.php", b"root:x:Root:root@example.org:admin\n");
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);
    assert_eq!(entries["wiki/conf/users.auth.php"].data, EMPTY_USERS_AUTH);
}

#[test]
fn keep_ips_archives_logs_unmodified() {
    let f = Fixture::new();
    let config = f.config().with_strip_ips(false);
    let report = BackupRunner::new(f.job(config)).run().unwrap();
    let entries = archive_map(&report.path);

    assert_eq!(entries["wiki/data/meta/start.changes"].data, CHANGES.as_bytes());
    assert_eq!(
        entries["wiki/data/meta/start.meta"].data,
        meta("192.0.2.7").as_bytes()
    );
    assert_eq!(entries["wiki/conf/users.auth.php"].data, EMPTY_USERS_AUTH);
    assert_eq!(report.filtered_files, 1);
}

#[test]
fn custom_sentinel_is_used() {
    let f = Fixture::new();
    let config = f.config().with_sentinel("0.0.0.0");
    let report = BackupRunner::new(f.job(config)).run().unwrap();
    let entries = archive_map(&report.path);
    assert_eq!(
        entries["wiki/data/meta/start.meta"].data,
        meta("0.0.0.0").as_bytes()
    );
}

#[test]
fn entries_are_rooted_and_ordered() {
    let f = Fixture::new();
    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let names: Vec<String> = read_archive(&report.path)
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    assert_eq!(names[0], "wiki");
    assert!(names.iter().all(|n| n == "wiki" || n.starts_with("wiki/")));
    // Parents come before their children
    let pos = |n: &str| names.iter().position(|x| x == n).unwrap();
    assert!(pos("wiki/data") < pos("wiki/data/meta"));
    assert!(pos("wiki/data/meta") < pos("wiki/data/meta/start.meta"));
    assert_eq!(report.entries(), names.len() as u64);
}

#[cfg(unix)]
#[test]
fn filtered_files_keep_source_metadata() {
    use std::os::unix::fs::PermissionsExt;

    let f = Fixture::new();
    let changes = f.root.join("data/meta/start.changes");
    fs::set_permissions(&changes, fs::Permissions::from_mode(0o640)).unwrap();
    let source_mtime = fs::metadata(&changes)
        .unwrap()
        .modified()
        .unwrap()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);
    let entry = &entries["wiki/data/meta/start.changes"];
    assert_eq!(entry.mode & 0o777, 0o640);
    assert_eq!(entry.mtime, source_mtime);
    assert_eq!(entry.kind, tar::EntryType::Regular);
}

#[cfg(unix)]
#[test]
fn symlinks_are_archived_not_followed() {
    let f = Fixture::new();
    std::os::unix::fs::symlink("start.txt", f.root.join("data/pages/home.txt")).unwrap();
    // A link into an excluded tree is still just a link
    std::os::unix::fs::symlink("../cache", f.root.join("data/pages/cached")).unwrap();

    let report = BackupRunner::new(f.job(f.config())).run().unwrap();
    let entries = archive_map(&report.path);

    let link = &entries["wiki/data/pages/home.txt"];
    assert_eq!(link.kind, tar::EntryType::Symlink);
    assert_eq!(link.link.as_deref(), Some(std::path::Path::new("start.txt")));
    assert!(link.data.is_empty());
    assert_eq!(
        entries["wiki/data/pages/cached"].kind,
        tar::EntryType::Symlink
    );
    assert!(!entries.keys().any(|n| n.starts_with("wiki/data/pages/cached/")));
    assert_eq!(report.symlinks, 2);
}
