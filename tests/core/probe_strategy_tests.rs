/*!
Tests for the icon and request probe executors against a mock client.
*/

use crate::common::{MockProbeClient, ICO_BYTES, PNG_BYTES};
use reachscan::core::probe::CancellationToken;
use reachscan::core::probe::chain::ProbeChain;
use reachscan::core::probe::client::{ProbeError, ProbeMethod, MAX_BODY_BYTES};
use reachscan::core::probe::strategy::{
    looks_like_image, probe_path, standard_strategies, IconProbe, ProbeStrategy, RequestProbe,
};
use reachscan::core::probe::types::{CheckStatus, ProbeKind};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(200);

fn icon_probe(client: MockProbeClient) -> (IconProbe, Arc<MockProbeClient>) {
    let client = Arc::new(client);
    (
        IconProbe::new(ProbeKind::FaviconIco, "/favicon.ico", client.clone()),
        client,
    )
}

#[tokio::test]
async fn test_icon_probe_accepts_real_icon() {
    let mut client = MockProbeClient::default();
    client.add_response("example.org/favicon.ico", 200, Some("image/x-icon"), ICO_BYTES);
    let (probe, client) = icon_probe(client);

    let outcome = probe
        .attempt("example.org", TIMEOUT, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, CheckStatus::Ok);
    assert!(outcome.latency_ms.is_some());

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.starts_with("https://example.org/favicon.ico?_="));
    assert!(requests[0].read_body);
    assert_eq!(requests[0].method, ProbeMethod::Get);
}

#[tokio::test]
async fn test_icon_probe_rejects_block_page() {
    let mut client = MockProbeClient::default();
    client.add_response(
        "blocked.org/favicon.ico",
        200,
        Some("text/html"),
        b"<html><body>Access denied</body></html>",
    );
    let (probe, _) = icon_probe(client);

    let outcome = probe
        .attempt("blocked.org", TIMEOUT, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, CheckStatus::Fail);
}

#[tokio::test]
async fn test_icon_probe_rejects_error_status_with_image_body() {
    let mut client = MockProbeClient::default();
    client.add_response("gone.org/favicon.ico", 404, Some("image/png"), PNG_BYTES);
    let (probe, _) = icon_probe(client);

    let outcome = probe
        .attempt("gone.org", TIMEOUT, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, CheckStatus::Fail);
}

#[tokio::test]
async fn test_slow_response_settles_as_timeout() {
    let mut client = MockProbeClient::default();
    client.add_response("slow.org/favicon.ico", 200, Some("image/x-icon"), ICO_BYTES);
    client.add_delay("slow.org/favicon.ico", Duration::from_millis(500));
    let (probe, _) = icon_probe(client);

    let outcome = probe
        .attempt("slow.org", Duration::from_millis(30), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, CheckStatus::Timeout);
}

#[tokio::test]
async fn test_transport_timeout_is_timeout_and_refusal_is_fail() {
    let mut client = MockProbeClient::default();
    client.add_error("a.org/", ProbeError::TimedOut);
    client.add_error("b.org/", ProbeError::Transport("refused".to_string()));
    let client = Arc::new(client);
    let probe = RequestProbe::new(ProbeKind::Head, ProbeMethod::Head, client.clone());
    let token = CancellationToken::new();

    assert_eq!(probe.attempt("a.org", TIMEOUT, &token).await.status, CheckStatus::Timeout);
    assert_eq!(probe.attempt("b.org", TIMEOUT, &token).await.status, CheckStatus::Fail);
}

#[tokio::test]
async fn test_request_probe_accepts_any_http_response() {
    let mut client = MockProbeClient::default();
    client.add_response("forbidden.org/", 403, Some("text/html"), b"");
    let client = Arc::new(client);
    let probe = RequestProbe::new(ProbeKind::Get, ProbeMethod::Get, client.clone());

    let outcome = probe
        .attempt("forbidden.org", TIMEOUT, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, CheckStatus::Ok);
    assert!(!client.requests()[0].read_body);
}

#[tokio::test]
async fn test_settled_after_cancel_has_no_latency() {
    let mut client = MockProbeClient::default();
    client.add_response("x.org/", 200, None, b"");
    let probe = RequestProbe::new(ProbeKind::Head, ProbeMethod::Head, Arc::new(client));
    let token = CancellationToken::new();
    token.cancel();

    let outcome = probe.attempt("x.org", TIMEOUT, &token).await;

    assert_eq!(outcome.latency_ms, None);
}

#[tokio::test]
async fn test_standard_chain_falls_back_to_head() {
    let mut client = MockProbeClient::default();
    client.add_response("nofavicon.org/favicon.ico", 404, Some("text/html"), b"<html>");
    client.add_response("nofavicon.org/", 200, Some("text/html"), b"");
    let client = Arc::new(client);
    let chain = ProbeChain::standard(client.clone());

    let outcome = chain
        .check("nofavicon.org", TIMEOUT, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, CheckStatus::Ok);
    assert_eq!(outcome.probe_used, Some(ProbeKind::Head));
    let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls.len(), 4);
    assert!(urls[1].contains("/apple-touch-icon.png?"));
    assert!(urls[2].contains("/favicon.png?"));
}

#[tokio::test]
async fn test_cache_bust_differs_between_attempts() {
    let client = Arc::new(MockProbeClient::default());
    let probe = RequestProbe::new(ProbeKind::Head, ProbeMethod::Head, client.clone());
    let token = CancellationToken::new();

    probe.attempt("c.org", TIMEOUT, &token).await;
    probe.attempt("c.org", TIMEOUT, &token).await;

    let requests = client.requests();
    assert_ne!(requests[0].url, requests[1].url);
}

#[test]
fn test_standard_strategies_order_and_paths() {
    let strategies = standard_strategies(Arc::new(MockProbeClient::default()));
    let kinds: Vec<ProbeKind> = strategies.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, ProbeKind::ALL.to_vec());
    assert_eq!(probe_path(ProbeKind::AppleTouchIcon), "/apple-touch-icon.png");
    assert_eq!(probe_path(ProbeKind::Get), "/");
}

#[test]
fn test_looks_like_image_magic_bytes() {
    assert!(looks_like_image(None, ICO_BYTES));
    assert!(looks_like_image(Some("text/html"), PNG_BYTES));
    assert!(looks_like_image(None, b"GIF89a...."));
    assert!(looks_like_image(None, b"RIFF\x00\x00\x00\x00WEBPVP8 "));
    assert!(!looks_like_image(Some("image/png"), b""));
}

#[test]
fn test_looks_like_image_content_type_rules() {
    assert!(looks_like_image(Some("image/svg+xml"), b"<?xml version=\"1.0\"?><svg></svg>"));
    assert!(!looks_like_image(Some("image/svg+xml"), b"<html></html>"));
    assert!(!looks_like_image(Some("image/x-icon"), b"  <!DOCTYPE html>"));
    assert!(looks_like_image(Some("image/vnd.microsoft.icon"), b"\x01\x02\x03"));
    assert!(!looks_like_image(Some("text/plain"), b"hello"));
}

#[test]
fn test_probe_url_shape() {
    use reachscan::core::probe::url::{build_probe_url, display_probe_url};

    let url = build_probe_url("example.org", "/favicon.ico").unwrap();
    assert!(url.starts_with("https://example.org/favicon.ico?_="));
    assert!(url.contains("&r="));
    assert_eq!(display_probe_url("example.org", "/"), "https://example.org/");

    assert!(build_probe_url("exa mple.org", "/").is_err());
}

#[tokio::test]
async fn test_icon_probe_reads_bounded_prefix_of_large_body() {
    let mut large_png = PNG_BYTES.to_vec();
    large_png.resize(2 * 1024 * 1024, 0);
    let mut large_page = b"<html><body>".to_vec();
    large_page.resize(2 * 1024 * 1024, b'x');

    let mut client = MockProbeClient::default();
    client.add_response("big.org/favicon.ico", 200, Some("image/png"), &large_png);
    client.add_response("portal.org/favicon.ico", 200, Some("text/html"), &large_page);
    let (probe, client) = icon_probe(client);
    let token = CancellationToken::new();

    assert_eq!(probe.attempt("big.org", TIMEOUT, &token).await.status, CheckStatus::Ok);
    assert_eq!(probe.attempt("portal.org", TIMEOUT, &token).await.status, CheckStatus::Fail);

    let requests = client.requests();
    assert!(requests.iter().all(|r| r.max_body_bytes == MAX_BODY_BYTES));
    assert!(MAX_BODY_BYTES < large_png.len());
}
