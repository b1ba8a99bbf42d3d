// Core types for domain reachability probing
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probe kinds in chain order
///
/// Order matters: the cheapest signal that cannot be faked by an error page
/// comes first, the weak request-level probes come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeKind {
    /// `/favicon.ico` loaded as an image
    FaviconIco,
    /// `/apple-touch-icon.png` loaded as an image
    AppleTouchIcon,
    /// `/favicon.png` loaded as an image
    FaviconPng,
    /// `HEAD /` - any HTTP response counts
    Head,
    /// `GET /` - any HTTP response counts
    Get,
}

impl ProbeKind {
    /// Fixed chain order
    pub const ALL: [ProbeKind; 5] = [
        ProbeKind::FaviconIco,
        ProbeKind::AppleTouchIcon,
        ProbeKind::FaviconPng,
        ProbeKind::Head,
        ProbeKind::Get,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::FaviconIco => "favicon-ico",
            ProbeKind::AppleTouchIcon => "apple-touch-icon",
            ProbeKind::FaviconPng => "favicon-png",
            ProbeKind::Head => "head",
            ProbeKind::Get => "get",
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-domain check status
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Fail,
    Timeout,
    #[default]
    Pending,
}

impl CheckStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckStatus::Pending)
    }

    /// Failed or timed out - the statuses a retry picks up
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail | CheckStatus::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Timeout => "timeout",
            CheckStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive tag attached by the list loader; carried through unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Service blocks access from the region itself (sanctions, geo-fencing)
    CompanyBlocked,
    /// Blocked by the regional regulator
    BlockedByRussia,
    /// Reachable only from inside the region
    RussianSpecific,
    /// Usually reachable
    Allowed,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::CompanyBlocked,
        Category::BlockedByRussia,
        Category::RussianSpecific,
        Category::Allowed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CompanyBlocked => "company_blocked",
            Category::BlockedByRussia => "blocked_by_russia",
            Category::RussianSpecific => "russian_specific",
            Category::Allowed => "allowed",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Outcome of one settled probe attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub kind: ProbeKind,
    /// Always terminal
    pub status: CheckStatus,
    /// None only when the attempt was abandoned through cancellation
    pub latency_ms: Option<u64>,
}

/// A domain queued for checking, with its loader-assigned category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    pub domain: String,
    pub category: Option<Category>,
}

impl DomainEntry {
    pub fn new(domain: impl Into<String>, category: Option<Category>) -> Self {
        Self {
            domain: domain.into(),
            category,
        }
    }
}

/// Per-domain result record
///
/// Invariant: `probe_used` is `Some` iff `status == Ok`, naming the first
/// probe in the chain that succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCheckResult {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub status: CheckStatus,
    pub probe_used: Option<ProbeKind>,
    pub latency_ms: Option<u64>,
    /// None while pending
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Vec<ProbeOutcome>,
}

impl DomainCheckResult {
    /// Placeholder installed when a run starts
    pub fn pending(entry: &DomainEntry) -> Self {
        Self {
            domain: entry.domain.clone(),
            category: entry.category,
            status: CheckStatus::Pending,
            probe_used: None,
            latency_ms: None,
            checked_at: None,
            details: Vec::new(),
        }
    }

    pub fn entry(&self) -> DomainEntry {
        DomainEntry::new(self.domain.clone(), self.category)
    }
}

/// Run statistics, always derived from the result collection
///
/// Invariant: `total == ok + fail + timeout + pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    pub timeout: usize,
    pub pending: usize,
    pub duration_ms: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
}

impl RunStats {
    pub fn from_results(
        results: &[DomainCheckResult],
        started_at: Option<DateTime<Utc>>,
        duration_ms: Option<u64>,
    ) -> Self {
        let mut stats = RunStats {
            total: results.len(),
            started_at,
            duration_ms,
            ..Default::default()
        };
        for result in results {
            match result.status {
                CheckStatus::Ok => stats.ok += 1,
                CheckStatus::Fail => stats.fail += 1,
                CheckStatus::Timeout => stats.timeout += 1,
                CheckStatus::Pending => stats.pending += 1,
            }
        }
        stats
    }

    /// Domains that reached a terminal status
    pub fn done(&self) -> usize {
        self.ok + self.fail + self.timeout
    }
}

/// Per-category breakdown for the summary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: Category,
    pub ok: usize,
    pub fail: usize,
    pub timeout: usize,
    pub total: usize,
    pub done: usize,
}

/// Coarse network verdict for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    #[default]
    Ok,
    Partial,
    NoInternet,
    ListsUnavailable,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Partial => "partial",
            HealthStatus::NoInternet => "no-internet",
            HealthStatus::ListsUnavailable => "lists-unavailable",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health verdict plus the inputs it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsState {
    pub control_primary: Option<CheckStatus>,
    pub control_list_host: Option<CheckStatus>,
    pub lists_loaded: bool,
    pub used_fallback_list: bool,
    pub health_status: HealthStatus,
    pub health_message: String,
    /// ok / terminal, in [0, 1]
    pub ok_ratio: f64,
}
