//! Probe strategies
//!
//! Two executors cover the whole chain:
//! - `IconProbe`: loads an icon resource and succeeds only if a decodable-looking
//!   image came back. Block pages, error pages and 404 HTML all fail here.
//! - `RequestProbe`: HEAD or GET on `/`; any HTTP response counts as reachable.
//!   This is the weaker signal and only runs after every icon probe failed.

use crate::core::debug_logger::get_debug_logger;
use tokio_util::sync::CancellationToken;
use crate::core::probe::client::{
    ProbeClient, ProbeError, ProbeMethod, ProbeRequest, ProbeResponse, MAX_BODY_BYTES,
};
use crate::core::probe::types::{CheckStatus, ProbeKind, ProbeOutcome};
use crate::core::probe::url::build_probe_url;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slack given to the transport timeout so the strategy timer settles first
const TRANSPORT_TIMEOUT_SLACK_MS: u64 = 1000;

/// One reachability probe against a domain
///
/// `attempt` never fails: refusals, bad content and timeouts are all encoded
/// in the returned `ProbeOutcome`.
#[async_trait::async_trait]
pub trait ProbeStrategy: Send + Sync {
    fn kind(&self) -> ProbeKind;

    async fn attempt(
        &self,
        domain: &str,
        timeout: Duration,
        token: &CancellationToken,
    ) -> ProbeOutcome;
}

/// Icon-resource probe parameterized by path
pub struct IconProbe {
    kind: ProbeKind,
    path: &'static str,
    client: Arc<dyn ProbeClient>,
}

impl IconProbe {
    pub fn new(kind: ProbeKind, path: &'static str, client: Arc<dyn ProbeClient>) -> Self {
        Self { kind, path, client }
    }
}

#[async_trait::async_trait]
impl ProbeStrategy for IconProbe {
    fn kind(&self) -> ProbeKind {
        self.kind
    }

    async fn attempt(
        &self,
        domain: &str,
        timeout: Duration,
        token: &CancellationToken,
    ) -> ProbeOutcome {
        execute_attempt(
            self.client.as_ref(),
            self.kind,
            domain,
            self.path,
            ProbeMethod::Get,
            true,
            timeout,
            token,
            |response| {
                (200..300).contains(&response.status_code)
                    && looks_like_image(response.content_type.as_deref(), &response.body)
            },
        )
        .await
    }
}

/// Header-only or body request probe on `/`
pub struct RequestProbe {
    kind: ProbeKind,
    method: ProbeMethod,
    client: Arc<dyn ProbeClient>,
}

impl RequestProbe {
    pub fn new(kind: ProbeKind, method: ProbeMethod, client: Arc<dyn ProbeClient>) -> Self {
        Self {
            kind,
            method,
            client,
        }
    }
}

#[async_trait::async_trait]
impl ProbeStrategy for RequestProbe {
    fn kind(&self) -> ProbeKind {
        self.kind
    }

    async fn attempt(
        &self,
        domain: &str,
        timeout: Duration,
        token: &CancellationToken,
    ) -> ProbeOutcome {
        // Opaque request: the status code is not inspected, completing the exchange is the signal
        execute_attempt(
            self.client.as_ref(),
            self.kind,
            domain,
            "/",
            self.method,
            false,
            timeout,
            token,
            |_| true,
        )
        .await
    }
}

/// Resource path probed by each kind
pub fn probe_path(kind: ProbeKind) -> &'static str {
    match kind {
        ProbeKind::FaviconIco => "/favicon.ico",
        ProbeKind::AppleTouchIcon => "/apple-touch-icon.png",
        ProbeKind::FaviconPng => "/favicon.png",
        ProbeKind::Head | ProbeKind::Get => "/",
    }
}

/// The five production strategies in chain order
pub fn standard_strategies(client: Arc<dyn ProbeClient>) -> Vec<Arc<dyn ProbeStrategy>> {
    ProbeKind::ALL
        .into_iter()
        .map(|kind| -> Arc<dyn ProbeStrategy> {
            match kind {
                ProbeKind::FaviconIco | ProbeKind::AppleTouchIcon | ProbeKind::FaviconPng => {
                    Arc::new(IconProbe::new(kind, probe_path(kind), client.clone()))
                }
                ProbeKind::Head => {
                    Arc::new(RequestProbe::new(kind, ProbeMethod::Head, client.clone()))
                }
                ProbeKind::Get => {
                    Arc::new(RequestProbe::new(kind, ProbeMethod::Get, client.clone()))
                }
            }
        })
        .collect()
}

/// Shared attempt executor
///
/// Races the client against the timer; the first of success, failure or
/// expiry settles the attempt and the losing branch is dropped, so there is
/// exactly one classification per attempt.
#[allow(clippy::too_many_arguments)]
async fn execute_attempt<F>(
    client: &dyn ProbeClient,
    kind: ProbeKind,
    domain: &str,
    path: &str,
    method: ProbeMethod,
    read_body: bool,
    timeout: Duration,
    token: &CancellationToken,
    accept: F,
) -> ProbeOutcome
where
    F: Fn(&ProbeResponse) -> bool,
{
    let logger = get_debug_logger();
    let start = Instant::now();

    let url = match build_probe_url(domain, path) {
        Ok(url) => url,
        Err(e) => {
            logger.error_sync("ProbeStrategy", "bad_probe_url", &format!("{}: {}", domain, e));
            return settle(kind, CheckStatus::Fail, start, token);
        }
    };

    let request = ProbeRequest {
        url,
        method,
        timeout_ms: timeout.as_millis() as u64 + TRANSPORT_TIMEOUT_SLACK_MS,
        read_body,
        max_body_bytes: MAX_BODY_BYTES,
    };

    let status = match tokio::time::timeout(timeout, client.fetch(request)).await {
        Err(_elapsed) => CheckStatus::Timeout,
        Ok(Err(ProbeError::TimedOut)) => CheckStatus::Timeout,
        Ok(Err(_)) => CheckStatus::Fail,
        Ok(Ok(response)) => {
            if accept(&response) {
                CheckStatus::Ok
            } else {
                CheckStatus::Fail
            }
        }
    };

    let outcome = settle(kind, status, start, token);
    logger.probe_attempt(domain, kind.as_str(), status.as_str(), outcome.latency_ms);
    outcome
}

fn settle(kind: ProbeKind, status: CheckStatus, start: Instant, token: &CancellationToken) -> ProbeOutcome {
    // Settled after cancellation: keep the classification but mark it abandoned
    let latency_ms = if token.is_cancelled() {
        None
    } else {
        Some(start.elapsed().as_millis() as u64)
    };
    ProbeOutcome {
        kind,
        status,
        latency_ms,
    }
}

/// Decide whether a response body would load as an image
///
/// Magic bytes win; otherwise an `image/*` content type with a non-markup body
/// is accepted. SVG is accepted only with an SVG content type and an `<svg` root.
pub fn looks_like_image(content_type: Option<&str>, body: &[u8]) -> bool {
    if body.is_empty() {
        return false;
    }

    let magic: &[&[u8]] = &[
        &[0x00, 0x00, 0x01, 0x00], // ICO
        &[0x00, 0x00, 0x02, 0x00], // CUR
        &[0x89, b'P', b'N', b'G'],
        b"GIF87a",
        b"GIF89a",
        &[0xFF, 0xD8, 0xFF], // JPEG
        b"BM",
    ];
    if magic.iter().any(|m| body.starts_with(m)) {
        return true;
    }
    if body.len() >= 12 && &body[0..4] == b"RIFF" && &body[8..12] == b"WEBP" {
        return true;
    }
    if body.len() >= 12 && &body[4..8] == b"ftyp" && (&body[8..12] == b"avif" || &body[8..12] == b"avis") {
        return true;
    }

    let content_type = match content_type {
        Some(ct) => ct.trim().to_ascii_lowercase(),
        None => return false,
    };
    if content_type.starts_with("image/svg") {
        let head = String::from_utf8_lossy(&body[..body.len().min(1024)]).to_ascii_lowercase();
        return head.contains("<svg");
    }
    if content_type.starts_with("image/") {
        let first = body.iter().find(|b| !b.is_ascii_whitespace());
        return first != Some(&b'<');
    }
    false
}
