//! Probe URL construction
//!
//! Every probe hits `https://{domain}{path}` with a unique query string so a
//! cached success or failure from an earlier attempt cannot reappear.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL format: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Missing host in URL")]
    MissingHost,
}

/// Cache-busting query: wall-clock millis plus a random token
pub fn cache_bust() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("_={}&r={}", millis, &token[..10])
}

/// Build a probe URL for `domain` and `path` with a fresh cache-bust query
///
/// # Examples
/// - `("example.org", "/favicon.ico")` → `https://example.org/favicon.ico?_=1737800000000&r=3f9c0a1b2d`
/// - `("example.org", "/")` → `https://example.org/?_=...`
pub fn build_probe_url(domain: &str, path: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(&format!("https://{}{}", domain, path))?;
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }
    url.set_query(Some(&cache_bust()));
    Ok(url.to_string())
}

/// Probe URL without the cache-bust query, for display
pub fn display_probe_url(domain: &str, path: &str) -> String {
    format!("https://{}{}", domain, path)
}
