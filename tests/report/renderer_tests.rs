use reachscan::core::probe::types::{
    Category, CategoryStats, CheckStatus, DiagnosticsState, DomainCheckResult, DomainEntry,
    HealthStatus, ProbeKind, RunStats,
};
use reachscan::core::run::control::{ControlDomains, ControlResults};
use reachscan::report::SummaryRenderer;
use reachscan::sources::snapshot::Snapshot;

fn diagnostics(status: HealthStatus, ratio: f64) -> DiagnosticsState {
    DiagnosticsState {
        control_primary: Some(CheckStatus::Ok),
        control_list_host: Some(CheckStatus::Ok),
        lists_loaded: true,
        used_fallback_list: false,
        health_status: status,
        health_message: "message".to_string(),
        ok_ratio: ratio,
    }
}

#[test]
fn test_health_line_emoji() {
    let renderer = SummaryRenderer::plain();
    assert_eq!(
        renderer.render_health(&diagnostics(HealthStatus::Ok, 0.9)),
        "🟢 message (90% ok)"
    );
    assert!(renderer
        .render_health(&diagnostics(HealthStatus::Partial, 0.5))
        .starts_with("🟡"));
    assert!(renderer
        .render_health(&diagnostics(HealthStatus::NoInternet, 0.0))
        .starts_with("🔴"));
    assert!(renderer
        .render_health(&diagnostics(HealthStatus::ListsUnavailable, 0.0))
        .starts_with("⚪"));
}

#[test]
fn test_controls_line_marks_unreached() {
    let renderer = SummaryRenderer::plain();
    let line = renderer.render_controls(
        &ControlResults {
            primary: Some(CheckStatus::Timeout),
            list_host: None,
        },
        &ControlDomains::default(),
    );
    assert_eq!(
        line,
        "Control: wikipedia.org timeout | raw.githubusercontent.com -"
    );
}

#[test]
fn test_stats_line() {
    let renderer = SummaryRenderer::plain();
    let mut stats = RunStats {
        total: 10,
        ok: 6,
        fail: 2,
        timeout: 1,
        pending: 1,
        duration_ms: Some(2500),
        started_at: None,
    };
    assert_eq!(
        renderer.render_stats(&stats),
        "Total: 10 | ok: 6 | fail: 2 | timeout: 1 | pending: 1 | 2.5s"
    );

    stats.duration_ms = None;
    assert!(renderer.render_stats(&stats).ends_with("running"));
}

#[test]
fn test_failed_list_shows_snapshot_membership() {
    let renderer = SummaryRenderer::plain();
    let snapshot = Snapshot::from_bytes(br#"{"domains": ["blocked.test"]}"#).unwrap();

    let mut blocked =
        DomainCheckResult::pending(&DomainEntry::new("blocked.test", Some(Category::BlockedByRussia)));
    blocked.status = CheckStatus::Fail;
    let mut slow = DomainCheckResult::pending(&DomainEntry::new("slow.test", None));
    slow.status = CheckStatus::Timeout;
    let mut fine = DomainCheckResult::pending(&DomainEntry::new("fine.test", None));
    fine.status = CheckStatus::Ok;

    let out = renderer.render_failed(&[blocked, fine, slow], Some(&snapshot));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("fail blocked.test"));
    assert!(lines[0].ends_with("(snapshot: yes)"));
    assert!(lines[1].contains("timeout slow.test"));
    assert!(lines[1].ends_with("(snapshot: no)"));
}

#[test]
fn test_result_line() {
    let renderer = SummaryRenderer::plain();
    let mut result = DomainCheckResult::pending(&DomainEntry::new("a.test", None));
    result.status = CheckStatus::Ok;
    result.probe_used = Some(ProbeKind::Head);
    result.latency_ms = Some(120);

    assert_eq!(renderer.render_result(&result), "ok a.test via head 120ms");
}

#[test]
fn test_categories_table() {
    let renderer = SummaryRenderer::plain();
    assert!(renderer.render_categories(&[]).is_empty());

    let table = renderer.render_categories(&[
        CategoryStats {
            category: Category::CompanyBlocked,
            ok: 3,
            fail: 1,
            timeout: 0,
            total: 4,
            done: 4,
        },
        CategoryStats {
            category: Category::Allowed,
            ok: 2,
            fail: 0,
            timeout: 0,
            total: 2,
            done: 2,
        },
    ]);
    assert_eq!(table.lines().count(), 2);
    assert!(table.contains("3/4"));
}
