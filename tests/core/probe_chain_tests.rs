/*!
Tests for the probe chain state machine.

Covers verdict classification, `probe_used`, the representative latency and
the cancellation points inside a chain.
*/

use crate::common::Script;
use reachscan::core::probe::CancellationToken;
use reachscan::core::probe::chain::{exhausted_status, representative_latency};
use reachscan::core::probe::types::{CheckStatus, ProbeKind, ProbeOutcome};
use std::time::Duration;

use CheckStatus::{Fail, Ok as Success, Timeout};

const TIMEOUT: Duration = Duration::from_millis(100);

#[tokio::test]
async fn test_first_probe_success_stops_chain() {
    let (chain, script) = Script::new().into_chain();
    let token = CancellationToken::new();

    let outcome = chain.check("example.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, Success);
    assert_eq!(outcome.probe_used, Some(ProbeKind::FaviconIco));
    assert_eq!(outcome.details.len(), 1);
    assert_eq!(script.attempts().len(), 1);
}

#[tokio::test]
async fn test_fallback_success_names_first_successful_probe() {
    let (chain, script) = Script::new()
        .domain("example.org", &[Fail, Timeout, Fail, Success, Success])
        .into_chain();
    let token = CancellationToken::new();

    let outcome = chain.check("example.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, Success);
    assert_eq!(outcome.probe_used, Some(ProbeKind::Head));
    assert_eq!(outcome.details.len(), 4);
    let kinds: Vec<ProbeKind> = script.attempts().into_iter().map(|(_, k)| k).collect();
    assert_eq!(kinds, ProbeKind::ALL[..4].to_vec());
}

#[tokio::test]
async fn test_all_timeouts_classify_as_timeout() {
    let (chain, _) = Script::new()
        .domain("slow.org", &[Timeout; 5])
        .into_chain();
    let token = CancellationToken::new();

    let outcome = chain.check("slow.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, Timeout);
    assert_eq!(outcome.probe_used, None);
    assert_eq!(outcome.details.len(), 5);
    assert!(outcome.details.iter().all(|d| d.status == Timeout));
}

#[tokio::test]
async fn test_single_definitive_failure_downgrades_to_fail() {
    let (chain, _) = Script::new()
        .domain("mixed.org", &[Fail, Timeout, Timeout, Fail, Timeout])
        .into_chain();
    let token = CancellationToken::new();

    let outcome = chain.check("mixed.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, Fail);
    assert_eq!(outcome.probe_used, None);
    assert_eq!(outcome.details.len(), 5);
}

#[tokio::test]
async fn test_late_failure_after_timeouts_is_fail() {
    let (chain, _) = Script::new()
        .domain("late.org", &[Timeout, Timeout, Timeout, Timeout, Fail])
        .into_chain();
    let token = CancellationToken::new();

    let outcome = chain.check("late.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, Fail);
}

#[tokio::test]
async fn test_latency_is_first_non_null() {
    let (chain, _) = Script::new()
        .domain("lat.org", &[Fail, Fail, Fail, Fail, Fail])
        .latencies("lat.org", &[None, Some(42), Some(7), None, Some(1)])
        .into_chain();
    let token = CancellationToken::new();

    let outcome = chain.check("lat.org", TIMEOUT, &token).await;

    assert_eq!(outcome.latency_ms, Some(42));
}

#[tokio::test]
async fn test_cancelled_before_start_issues_no_probe() {
    let (chain, script) = Script::new().into_chain();
    let token = CancellationToken::new();
    token.cancel();

    let outcome = chain.check("example.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, CheckStatus::Pending);
    assert!(outcome.details.is_empty());
    assert!(script.attempts().is_empty());
}

#[tokio::test]
async fn test_cancel_during_attempt_abandons_chain() {
    let token = CancellationToken::new();
    let (chain, script) = Script::new()
        .domain("stop.org", &[Fail, Fail, Fail, Fail, Fail])
        .cancel_on("stop.org", token.clone())
        .into_chain();

    let outcome = chain.check("stop.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, CheckStatus::Pending);
    assert_eq!(outcome.probe_used, None);
    // Only the attempt that was in flight ran
    assert_eq!(script.attempts().len(), 1);
}

#[tokio::test]
async fn test_cancel_overrides_success_settled_after_cancellation() {
    let token = CancellationToken::new();
    let (chain, _) = Script::new()
        .cancel_on("racy.org", token.clone())
        .into_chain();

    let outcome = chain.check("racy.org", TIMEOUT, &token).await;

    assert_eq!(outcome.status, CheckStatus::Pending);
}

#[test]
fn test_exhausted_status_rules() {
    let outcome = |status| ProbeOutcome {
        kind: ProbeKind::Get,
        status,
        latency_ms: Some(1),
    };

    assert_eq!(exhausted_status(&[outcome(Timeout), outcome(Timeout)]), Timeout);
    assert_eq!(exhausted_status(&[outcome(Timeout), outcome(Fail)]), Fail);
    assert_eq!(exhausted_status(&[]), Fail);
}

#[test]
fn test_representative_latency_skips_nulls() {
    let details = vec![
        ProbeOutcome {
            kind: ProbeKind::FaviconIco,
            status: Fail,
            latency_ms: None,
        },
        ProbeOutcome {
            kind: ProbeKind::AppleTouchIcon,
            status: Fail,
            latency_ms: Some(15),
        },
    ];

    assert_eq!(representative_latency(&details), Some(15));
    assert_eq!(representative_latency(&[]), None);
}
