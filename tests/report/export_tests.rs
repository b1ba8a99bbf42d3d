use crate::common::create_temp_dir;
use reachscan::core::probe::types::{
    Category, CheckStatus, DiagnosticsState, DomainCheckResult, DomainEntry, HealthStatus,
    ProbeKind, RunStats,
};
use reachscan::report::{ExportDocument, ExportError};
use reachscan::sources::snapshot::{Snapshot, SnapshotInfo};

fn result(domain: &str, status: CheckStatus, category: Option<Category>) -> DomainCheckResult {
    let mut result = DomainCheckResult::pending(&DomainEntry::new(domain, category));
    result.status = status;
    if status.is_terminal() {
        result.checked_at = Some(chrono::Utc::now());
        result.latency_ms = Some(42);
    }
    if status == CheckStatus::Ok {
        result.probe_used = Some(ProbeKind::AppleTouchIcon);
    }
    result
}

fn diagnostics() -> DiagnosticsState {
    DiagnosticsState {
        control_primary: Some(CheckStatus::Ok),
        control_list_host: Some(CheckStatus::Fail),
        lists_loaded: true,
        used_fallback_list: false,
        health_status: HealthStatus::Partial,
        health_message: "Partially unavailable: 2/4 domains reachable".to_string(),
        ok_ratio: 0.5,
    }
}

fn document(snapshot_info: SnapshotInfo) -> ExportDocument {
    let results = vec![
        result("a.test", CheckStatus::Ok, Some(Category::Allowed)),
        result("b.test", CheckStatus::Ok, None),
        result("c.test", CheckStatus::Timeout, Some(Category::BlockedByRussia)),
        result("d.test", CheckStatus::Pending, None),
    ];
    let stats = RunStats::from_results(&results, Some(chrono::Utc::now()), Some(1234));
    ExportDocument::new(stats, diagnostics(), results, snapshot_info)
}

#[test]
fn test_export_uses_camel_case_fields() {
    let json = document(SnapshotInfo::default()).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in ["exportedAt", "stats", "diagnostics", "results", "snapshotInfo"] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["stats"]["durationMs"], 1234);
    assert_eq!(value["diagnostics"]["healthStatus"], "partial");
    assert_eq!(value["diagnostics"]["controlListHost"], "fail");
    assert_eq!(value["results"][0]["probeUsed"], "apple-touch-icon");
    assert_eq!(value["results"][0]["category"], "allowed");
    assert_eq!(value["results"][3]["status"], "pending");
    assert!(value["results"][3]["checkedAt"].is_null());
    assert_eq!(value["snapshotInfo"]["hasSnapshot"], false);
}

#[test]
fn test_stats_recompute_from_reimported_results() {
    let json = document(SnapshotInfo::default()).to_json().unwrap();
    let imported = ExportDocument::from_json(&json).unwrap();

    let recomputed = imported.recomputed_stats();
    assert_eq!(recomputed, imported.stats);
    assert_eq!(recomputed.total, 4);
    assert_eq!(recomputed.ok, 2);
    assert_eq!(recomputed.timeout, 1);
    assert_eq!(recomputed.pending, 1);
}

#[test]
fn test_export_carries_snapshot_info() {
    let snapshot = Snapshot::from_bytes(br#"{"updatedAt": "2026-09-30", "domains": ["c.test"]}"#)
        .unwrap();
    let json = document(snapshot.info()).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["snapshotInfo"]["hasSnapshot"], true);
    assert_eq!(value["snapshotInfo"]["updatedAt"], "2026-09-30");
    assert_eq!(
        value["snapshotInfo"]["sha256"].as_str().map(str::len),
        Some(64)
    );
}

#[test]
fn test_write_to_file() {
    let dir = create_temp_dir();
    let path = dir.path().join("run.json");
    let doc = document(SnapshotInfo::default());

    doc.write_to(&path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(ExportDocument::from_json(&written).unwrap(), doc);

    let bad = dir.path().join("missing").join("run.json");
    assert!(matches!(doc.write_to(&bad), Err(ExportError::Io { .. })));
}
