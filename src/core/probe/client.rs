//! Probe Client Implementations
//!
//! HTTP client abstraction used by the probe strategies. The client only
//! reports what the transport saw (status, content type, optional body);
//! deciding whether that counts as reachable is the strategy's job.

use std::time::Duration;

#[cfg(feature = "network-probes")]
use isahc::config::{Configurable, RedirectPolicy};
#[cfg(feature = "network-probes")]
use isahc::{HttpClient, Request};
#[cfg(feature = "network-probes")]
use futures::AsyncReadExt;

/// Redirect hops followed before giving up, matching browser image loads
pub const MAX_REDIRECTS: u32 = 5;

/// Body prefix kept for image sniffing; the rest of the response is never read
pub const MAX_BODY_BYTES: usize = 4096;

/// HTTP method used by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Get,
    Head,
}

/// One outgoing probe request
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Complete URL including the cache-bust query
    pub url: String,
    pub method: ProbeMethod,
    /// Transport-level timeout; the strategy's own timer normally fires first
    pub timeout_ms: u64,
    /// Whether the response body is needed (image sniffing)
    pub read_body: bool,
    /// Upper bound on the bytes read from the body
    pub max_body_bytes: usize,
}

/// What came back from the transport
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status_code: u16,
    /// Lower-cased `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Empty unless `read_body` was requested; at most `max_body_bytes` long
    pub body: Vec<u8>,
    pub duration: Duration,
}

/// Transport failure, kept separate so a client-side timeout is not read as a refusal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("probe timed out")]
    TimedOut,
    #[error("probe request could not be built: {0}")]
    Request(String),
    #[error("probe transport failed: {0}")]
    Transport(String),
}

/// HTTP client used by probe strategies
///
/// Implementations must not retry and must follow at most `MAX_REDIRECTS`
/// redirects, the way a browser resolves an `<img>` source.
#[async_trait::async_trait]
pub trait ProbeClient: Send + Sync {
    async fn fetch(&self, request: ProbeRequest) -> Result<ProbeResponse, ProbeError>;
}

/// Production probe client implementation using isahc
#[cfg(feature = "network-probes")]
pub struct IsahcProbeClient {
    client: HttpClient,
}

#[cfg(feature = "network-probes")]
#[async_trait::async_trait]
impl ProbeClient for IsahcProbeClient {
    async fn fetch(&self, request: ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        let start = std::time::Instant::now();

        let builder = match request.method {
            ProbeMethod::Get => Request::get(&request.url),
            ProbeMethod::Head => Request::head(&request.url),
        };

        let http_request = builder
            .timeout(Duration::from_millis(request.timeout_ms))
            .redirect_policy(RedirectPolicy::Limit(MAX_REDIRECTS))
            .header("Cache-Control", "no-store")
            .header("Pragma", "no-cache")
            .header("Accept", "image/avif,image/webp,image/png,image/*;q=0.8,*/*;q=0.5")
            .body(())
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        let mut response = self
            .client
            .send_async(http_request)
            .await
            .map_err(|e| match e.kind() {
                isahc::error::ErrorKind::Timeout => ProbeError::TimedOut,
                _ => ProbeError::Transport(e.to_string()),
            })?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(isahc::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let mut body = Vec::new();
        if request.read_body {
            AsyncReadExt::take(response.body_mut(), request.max_body_bytes as u64)
                .read_to_end(&mut body)
                .await
                .map_err(|e| ProbeError::Transport(format!("Failed to read probe body: {}", e)))?;
        }

        Ok(ProbeResponse {
            status_code,
            content_type,
            body,
            duration: start.elapsed(),
        })
    }
}

#[cfg(feature = "network-probes")]
impl IsahcProbeClient {
    pub fn new() -> Result<Self, ProbeError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::Limit(MAX_REDIRECTS))
            .build()
            .map_err(|e| ProbeError::Request(format!("Failed to create probe client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Client used when the crate is built without `network-probes`
///
/// Every request fails as a transport error, so every domain reports `fail`.
#[derive(Default)]
pub struct OfflineProbeClient;

#[async_trait::async_trait]
impl ProbeClient for OfflineProbeClient {
    async fn fetch(&self, _request: ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        Err(ProbeError::Transport(
            "built without network-probes support".to_string(),
        ))
    }
}

/// Default client for this build
pub fn default_probe_client() -> Result<std::sync::Arc<dyn ProbeClient>, ProbeError> {
    #[cfg(feature = "network-probes")]
    {
        Ok(std::sync::Arc::new(IsahcProbeClient::new()?))
    }
    #[cfg(not(feature = "network-probes"))]
    {
        Ok(std::sync::Arc::new(OfflineProbeClient))
    }
}
