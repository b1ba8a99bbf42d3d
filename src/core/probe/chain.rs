//! Probe chain state machine
//!
//! Walks the fixed strategy list for one domain:
//! - stop on the first `ok` (that kind becomes `probe_used`)
//! - stop as soon as cancellation is observed and report `pending`
//! - otherwise continue; once exhausted the verdict is `timeout` only if every
//!   attempt timed out, `fail` as soon as one definitive failure was seen

use tokio_util::sync::CancellationToken;
use crate::core::probe::client::ProbeClient;
use crate::core::probe::strategy::{standard_strategies, ProbeStrategy};
use crate::core::probe::types::{CheckStatus, ProbeKind, ProbeOutcome};
use std::sync::Arc;
use std::time::Duration;

/// Aggregate verdict for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    /// `Pending` only when cancelled mid-chain
    pub status: CheckStatus,
    pub probe_used: Option<ProbeKind>,
    pub latency_ms: Option<u64>,
    /// Every settled attempt, in chain order
    pub details: Vec<ProbeOutcome>,
}

/// Internal chain states
#[derive(Debug)]
enum ChainState {
    /// About to run the strategy at `index`
    Probing { index: usize },
    Succeeded { kind: ProbeKind, latency_ms: Option<u64> },
    Exhausted,
    Abandoned,
}

/// Ordered fallback sequence of probe strategies
#[derive(Clone)]
pub struct ProbeChain {
    strategies: Vec<Arc<dyn ProbeStrategy>>,
}

impl ProbeChain {
    /// Chain over arbitrary strategies (tests inject scripted ones here)
    pub fn new(strategies: Vec<Arc<dyn ProbeStrategy>>) -> Self {
        Self { strategies }
    }

    /// Production chain: three icon probes, then HEAD, then GET
    pub fn standard(client: Arc<dyn ProbeClient>) -> Self {
        Self::new(standard_strategies(client))
    }

    /// Run the chain for `domain`
    ///
    /// Never fails; every failure mode is a status.
    pub async fn check(
        &self,
        domain: &str,
        timeout: Duration,
        token: &CancellationToken,
    ) -> ChainOutcome {
        let mut details = Vec::with_capacity(self.strategies.len());
        let mut state = ChainState::Probing { index: 0 };

        let final_state = loop {
            state = match state {
                ChainState::Probing { index } => {
                    let Some(strategy) = self.strategies.get(index) else {
                        break ChainState::Exhausted;
                    };
                    if token.is_cancelled() {
                        break ChainState::Abandoned;
                    }

                    let outcome = strategy.attempt(domain, timeout, token).await;
                    let settled_ok = outcome.status == CheckStatus::Ok;
                    let kind = outcome.kind;
                    let latency_ms = outcome.latency_ms;
                    details.push(outcome);

                    if token.is_cancelled() {
                        ChainState::Abandoned
                    } else if settled_ok {
                        ChainState::Succeeded { kind, latency_ms }
                    } else if index + 1 < self.strategies.len() {
                        ChainState::Probing { index: index + 1 }
                    } else {
                        ChainState::Exhausted
                    }
                }
                terminal => break terminal,
            };
        };

        final_state.into_outcome(details)
    }
}

impl ChainState {
    fn into_outcome(self, details: Vec<ProbeOutcome>) -> ChainOutcome {
        match self {
            ChainState::Succeeded { kind, latency_ms } => ChainOutcome {
                status: CheckStatus::Ok,
                probe_used: Some(kind),
                latency_ms,
                details,
            },
            ChainState::Exhausted => ChainOutcome {
                status: exhausted_status(&details),
                probe_used: None,
                latency_ms: representative_latency(&details),
                details,
            },
            // Probing never escapes the loop
            ChainState::Abandoned | ChainState::Probing { .. } => ChainOutcome {
                status: CheckStatus::Pending,
                probe_used: None,
                latency_ms: None,
                details,
            },
        }
    }
}

/// `timeout` only if every attempt timed out; any definitive failure means `fail`
pub fn exhausted_status(details: &[ProbeOutcome]) -> CheckStatus {
    if !details.is_empty() && details.iter().all(|d| d.status == CheckStatus::Timeout) {
        CheckStatus::Timeout
    } else {
        CheckStatus::Fail
    }
}

/// Latency of the earliest attempt that recorded one
pub fn representative_latency(details: &[ProbeOutcome]) -> Option<u64> {
    details.iter().find_map(|d| d.latency_ms)
}
