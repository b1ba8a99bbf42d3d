//! Control connectivity checks
//!
//! Two reference domains calibrate how the bulk run is read:
//! - primary anchor: a widely reachable site that serves a favicon
//! - list host: where the domain lists are downloaded from
//!
//! They run one after the other through the same probe chain, so the extra
//! load is bounded and independent of the bulk run's concurrency.

use tokio_util::sync::CancellationToken;
use crate::core::probe::chain::ProbeChain;
use crate::core::probe::types::CheckStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default control-probe timeout, longer than the bulk timeout
pub const DEFAULT_CONTROL_TIMEOUT_MS: u64 = 8000;

/// Reference domains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlDomains {
    pub primary: String,
    pub list_host: String,
}

impl Default for ControlDomains {
    fn default() -> Self {
        Self {
            // example.com has no favicon, so it would always look blocked
            primary: "wikipedia.org".to_string(),
            list_host: "raw.githubusercontent.com".to_string(),
        }
    }
}

/// Terminal statuses of the control probes; `None` when not reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlResults {
    pub primary: Option<CheckStatus>,
    pub list_host: Option<CheckStatus>,
}

impl ControlResults {
    pub fn primary_failed(&self) -> bool {
        matches!(self.primary, Some(status) if status.is_failure())
    }

    pub fn list_host_failed(&self) -> bool {
        matches!(self.list_host, Some(status) if status.is_failure())
    }
}

/// Sequential prober for the two control domains
pub struct ControlChecker {
    chain: ProbeChain,
    domains: ControlDomains,
    timeout: Duration,
}

impl ControlChecker {
    pub fn new(chain: ProbeChain, domains: ControlDomains, timeout: Duration) -> Self {
        Self {
            chain,
            domains,
            timeout,
        }
    }

    pub fn domains(&self) -> &ControlDomains {
        &self.domains
    }

    /// Probe primary, then list host
    ///
    /// Cancellation skips whatever has not started; results already settled
    /// are kept. A chain abandoned mid-way leaves its slot `None`.
    pub async fn run(&self, token: &CancellationToken) -> ControlResults {
        let mut results = ControlResults::default();

        if token.is_cancelled() {
            return results;
        }
        results.primary = self.check_one(&self.domains.primary, token).await;

        if token.is_cancelled() {
            return results;
        }
        results.list_host = self.check_one(&self.domains.list_host, token).await;

        results
    }

    async fn check_one(&self, domain: &str, token: &CancellationToken) -> Option<CheckStatus> {
        let outcome = self.chain.check(domain, self.timeout, token).await;
        outcome.status.is_terminal().then_some(outcome.status)
    }
}
