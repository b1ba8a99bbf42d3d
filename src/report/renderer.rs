// Terminal summary rendering for a run
use crate::core::probe::types::{
    CategoryStats, CheckStatus, DiagnosticsState, DomainCheckResult, HealthStatus, RunStats,
};
use crate::core::run::control::{ControlDomains, ControlResults};
use crate::sources::presets::category_info;
use crate::sources::snapshot::{snapshot_status, Snapshot};

/// Renders run state as plain or coloured text
pub struct SummaryRenderer {
    color: bool,
}

impl SummaryRenderer {
    pub fn new(color: bool) -> Self {
        // Colour needs the `color` feature
        Self {
            color: color && cfg!(feature = "color"),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Health line
    /// Emoji: 🟢/🟡/🔴/⚪ map to `ok/partial/no-internet/lists-unavailable`
    pub fn render_health(&self, diagnostics: &DiagnosticsState) -> String {
        let emoji = match diagnostics.health_status {
            HealthStatus::Ok => "🟢",
            HealthStatus::Partial => "🟡",
            HealthStatus::NoInternet => "🔴",
            HealthStatus::ListsUnavailable => "⚪",
        };
        format!(
            "{} {} ({:.0}% ok)",
            emoji,
            diagnostics.health_message,
            diagnostics.ok_ratio * 100.0
        )
    }

    pub fn render_controls(&self, controls: &ControlResults, domains: &ControlDomains) -> String {
        let show = |status: Option<CheckStatus>| match status {
            Some(status) => self.paint_status(status),
            None => "-".to_string(),
        };
        format!(
            "Control: {} {} | {} {}",
            domains.primary,
            show(controls.primary),
            domains.list_host,
            show(controls.list_host)
        )
    }

    pub fn render_stats(&self, stats: &RunStats) -> String {
        let duration = match stats.duration_ms {
            Some(ms) => format!("{:.1}s", ms as f64 / 1000.0),
            None => "running".to_string(),
        };
        format!(
            "Total: {} | ok: {} | fail: {} | timeout: {} | pending: {} | {}",
            stats.total, stats.ok, stats.fail, stats.timeout, stats.pending, duration
        )
    }

    /// Per-category table; empty when no result carries a category
    pub fn render_categories(&self, categories: &[CategoryStats]) -> String {
        if categories.is_empty() {
            return String::new();
        }

        let width = categories
            .iter()
            .map(|c| category_info(c.category).short_label.len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for stats in categories {
            let label = category_info(stats.category).short_label;
            out.push_str(&format!(
                "  {:<width$}  {:>3}/{:<3} ok  fail {:>3}  timeout {:>3}\n",
                label,
                stats.ok,
                stats.total,
                stats.fail,
                stats.timeout,
                width = width
            ));
        }
        out
    }

    /// Failed and timed-out domains with their snapshot membership
    pub fn render_failed(&self, results: &[DomainCheckResult], snapshot: Option<&Snapshot>) -> String {
        let mut out = String::new();
        for result in results.iter().filter(|r| r.status.is_failure()) {
            let category = result
                .category
                .map(|c| format!(" [{}]", category_info(c).short_label))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {} {}{} (snapshot: {})\n",
                self.paint_status(result.status),
                result.domain,
                category,
                snapshot_status(snapshot, &result.domain).as_str()
            ));
        }
        out
    }

    /// One streamed result
    pub fn render_result(&self, result: &DomainCheckResult) -> String {
        let latency = result
            .latency_ms
            .map(|ms| format!(" {}ms", ms))
            .unwrap_or_default();
        let probe = result
            .probe_used
            .map(|kind| format!(" via {}", kind))
            .unwrap_or_default();
        format!(
            "{} {}{}{}",
            self.paint_status(result.status),
            result.domain,
            probe,
            latency
        )
    }

    #[cfg(feature = "color")]
    fn paint_status(&self, status: CheckStatus) -> String {
        use ansi_term::Colour;

        if !self.color {
            return status.as_str().to_string();
        }
        let colour = match status {
            CheckStatus::Ok => Colour::Green,
            CheckStatus::Fail => Colour::Red,
            CheckStatus::Timeout => Colour::Yellow,
            CheckStatus::Pending => Colour::White,
        };
        colour.paint(status.as_str()).to_string()
    }

    #[cfg(not(feature = "color"))]
    fn paint_status(&self, status: CheckStatus) -> String {
        status.as_str().to_string()
    }
}

impl Default for SummaryRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
