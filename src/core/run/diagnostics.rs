//! Health verdict derivation
//!
//! Pure mapping from control results, list-load state and per-domain results
//! to a `DiagnosticsState`. Branches are tried in priority order; the first
//! match wins.

use crate::core::probe::types::{CheckStatus, DiagnosticsState, DomainCheckResult, HealthStatus};
use crate::core::run::control::ControlResults;
use serde::{Deserialize, Serialize};

/// Ratio thresholds used by the verdict
///
/// `other_connectivity_ratio` and `majority_ratio` are empirical; they are
/// configurable rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsThresholds {
    /// Strictly above this ok-ratio the run is `ok`
    pub ok_ratio: f64,
    /// At or above this ok-ratio a failed primary control is blamed on the anchor, not the link
    pub other_connectivity_ratio: f64,
    /// Splits the two `partial` messages
    pub majority_ratio: f64,
}

impl Default for DiagnosticsThresholds {
    fn default() -> Self {
        Self {
            ok_ratio: 0.85,
            other_connectivity_ratio: 0.15,
            majority_ratio: 0.5,
        }
    }
}

impl DiagnosticsThresholds {
    /// Thresholds with the ok-ratio given as a percentage (operator setting)
    pub fn with_ok_percent(percent: u8) -> Self {
        Self {
            ok_ratio: f64::from(percent.min(100)) / 100.0,
            ..Self::default()
        }
    }
}

/// Where the run stands when diagnostics are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    NotStarted,
    /// A run was requested but the list was empty after filtering
    NothingToCheck,
    Started,
}

/// Inputs of the verdict
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsInput<'a> {
    pub controls: ControlResults,
    pub lists_loaded: bool,
    pub used_fallback_list: bool,
    pub results: &'a [DomainCheckResult],
    pub phase: RunPhase,
}

/// Compute the health verdict
pub fn compute_diagnostics(
    input: &DiagnosticsInput<'_>,
    thresholds: &DiagnosticsThresholds,
) -> DiagnosticsState {
    let checked = input.results.iter().filter(|r| r.status.is_terminal());
    let (total, ok_count) = checked.fold((0usize, 0usize), |(total, ok), r| {
        (total + 1, ok + usize::from(r.status == CheckStatus::Ok))
    });
    let ok_ratio = if total > 0 {
        ok_count as f64 / total as f64
    } else {
        0.0
    };

    let controls = input.controls;
    let primary_failed = controls.primary_failed();
    let has_other_connectivity = total > 0 && ok_ratio >= thresholds.other_connectivity_ratio;
    let above_threshold = ok_ratio > thresholds.ok_ratio;

    let (health_status, health_message) = if primary_failed && !has_other_connectivity {
        (
            HealthStatus::NoInternet,
            "No internet or broken DNS: the control domain and the checked domains are unreachable"
                .to_string(),
        )
    } else if primary_failed {
        if above_threshold {
            (
                HealthStatus::Ok,
                format!(
                    "Connectivity is fine: the control domain did not respond, but {}/{} domains are reachable",
                    ok_count, total
                ),
            )
        } else {
            (
                HealthStatus::Partial,
                format!("Partial availability: {}/{}", ok_count, total),
            )
        }
    } else if controls.primary == Some(CheckStatus::Ok)
        && controls.list_host_failed()
        && input.used_fallback_list
    {
        (
            HealthStatus::ListsUnavailable,
            "Domain lists could not be downloaded from the list host; using the local list"
                .to_string(),
        )
    } else if controls.primary == Some(CheckStatus::Ok) && total > 0 {
        if above_threshold {
            (
                HealthStatus::Ok,
                "Access is normal, most domains are reachable".to_string(),
            )
        } else if ok_ratio >= thresholds.majority_ratio {
            (
                HealthStatus::Partial,
                format!("Partially unavailable: {}/{} domains reachable", ok_count, total),
            )
        } else {
            (
                HealthStatus::Partial,
                format!("Many domains are unreachable: {}/{}", ok_count, total),
            )
        }
    } else if !input.lists_loaded && input.used_fallback_list {
        (
            HealthStatus::ListsUnavailable,
            "Using the fallback list (list source unreachable)".to_string(),
        )
    } else if input.phase == RunPhase::NothingToCheck {
        (
            HealthStatus::Ok,
            "Nothing to check: the domain list is empty after filtering".to_string(),
        )
    } else {
        (HealthStatus::Ok, "Run not started yet".to_string())
    };

    DiagnosticsState {
        control_primary: controls.primary,
        control_list_host: controls.list_host,
        lists_loaded: input.lists_loaded,
        used_fallback_list: input.used_fallback_list,
        health_status,
        health_message,
        ok_ratio,
    }
}
