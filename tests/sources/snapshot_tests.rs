use crate::common::create_temp_dir;
use reachscan::sources::snapshot::{snapshot_info, snapshot_status, Snapshot, SnapshotError, SnapshotStatus};

#[test]
fn test_list_snapshot_matches_exact_and_parent() {
    let snapshot = Snapshot::from_bytes(
        br#"{"updatedAt": "2026-10-01", "domains": ["Blocked.example", "other.test"]}"#,
    )
    .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.status_of("blocked.example"), SnapshotStatus::Yes);
    assert_eq!(snapshot.status_of("cdn.blocked.example"), SnapshotStatus::Yes);
    assert_eq!(snapshot.status_of("notblocked.example"), SnapshotStatus::No);
    assert_eq!(snapshot.status_of("free.test"), SnapshotStatus::No);
}

#[test]
fn test_map_snapshot_uses_keys() {
    let snapshot =
        Snapshot::from_bytes(br#"{"domains": {"a.test": {"since": 2019}, "b.test": null}}"#)
            .unwrap();

    assert_eq!(snapshot.status_of("b.test"), SnapshotStatus::Yes);
    assert_eq!(snapshot.status_of("c.test"), SnapshotStatus::No);
}

#[test]
fn test_empty_or_absent_snapshot_is_unknown() {
    let empty = Snapshot::from_bytes(br#"{"domains": []}"#).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.status_of("a.test"), SnapshotStatus::Unknown);

    assert_eq!(snapshot_status(None, "a.test"), SnapshotStatus::Unknown);
    assert!(!snapshot_info(None).has_snapshot);
}

#[test]
fn test_info_carries_date_and_fingerprint() {
    let bytes = br#"{"updatedAt": "2026-10-01", "domains": ["a.test"]}"#;
    let info = Snapshot::from_bytes(bytes).unwrap().info();

    assert!(info.has_snapshot);
    assert_eq!(info.updated_at.as_deref(), Some("2026-10-01"));
    let sha = info.sha256.unwrap();
    assert_eq!(sha.len(), 64);
    assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));

    // Same bytes, same fingerprint
    let again = Snapshot::from_bytes(bytes).unwrap().info();
    assert_eq!(again.sha256.unwrap(), sha);
}

#[test]
fn test_load_errors() {
    let dir = create_temp_dir();

    let missing = Snapshot::load(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(SnapshotError::Io { .. })));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(Snapshot::load(&broken), Err(SnapshotError::Parse(_))));
}
