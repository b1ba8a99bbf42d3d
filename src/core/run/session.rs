//! Check session orchestration
//!
//! One `CheckSession` owns everything a run touches: list loading, control
//! checks, the scheduler and the result store. A run goes
//! load list -> pending records -> control checks -> bulk run -> verdict.

use crate::core::debug_logger::get_debug_logger;
use tokio_util::sync::CancellationToken;
use crate::core::probe::chain::ProbeChain;
use crate::core::probe::types::{CategoryStats, DiagnosticsState, RunStats};
use crate::core::run::control::{ControlChecker, ControlDomains, ControlResults};
use crate::core::run::diagnostics::{
    compute_diagnostics, DiagnosticsInput, DiagnosticsThresholds, RunPhase,
};
use crate::core::run::scheduler::{RunContext, RunEvent, RunReport, RunSettings, Scheduler};
use crate::core::run::store::ResultStore;
use crate::sources::loader::{DomainListLoader, ListSelection};
use std::time::{Duration, Instant};

/// Everything a session needs besides its collaborators
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub selection: ListSelection,
    pub limit: usize,
    pub settings: RunSettings,
    pub control_domains: ControlDomains,
    pub control_timeout: Duration,
    pub thresholds: DiagnosticsThresholds,
}

/// How `start_run` ended
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub report: RunReport,
    pub diagnostics: DiagnosticsState,
}

impl RunOutcome {
    /// The list was empty after loading and filtering; nothing was probed
    pub fn nothing_to_check(&self) -> bool {
        self.report.total == 0 && !self.report.cancelled
    }
}

pub struct CheckSession {
    loader: DomainListLoader,
    scheduler: Scheduler,
    control: ControlChecker,
    options: SessionOptions,
    store: ResultStore,
    controls: ControlResults,
    lists_loaded: bool,
    used_fallback: bool,
    phase: RunPhase,
    token: CancellationToken,
}

impl CheckSession {
    pub fn new(loader: DomainListLoader, chain: ProbeChain, options: SessionOptions) -> Self {
        let control = ControlChecker::new(
            chain.clone(),
            options.control_domains.clone(),
            options.control_timeout,
        );
        Self {
            loader,
            scheduler: Scheduler::new(chain),
            control,
            options,
            store: ResultStore::new(),
            controls: ControlResults::default(),
            lists_loaded: false,
            used_fallback: false,
            phase: RunPhase::NotStarted,
            token: CancellationToken::new(),
        }
    }

    /// Handle that stops the current run or retry
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Replace a spent token so the session can run again after a stop
    pub fn renew_token(&mut self) -> CancellationToken {
        self.token = CancellationToken::new();
        self.token.clone()
    }

    /// Load the list, probe controls, then probe every domain
    ///
    /// `on_event` sees every result and progress tick as it is applied.
    pub async fn start_run(&mut self, on_event: impl FnMut(&RunEvent)) -> RunOutcome {
        let logger = get_debug_logger();

        self.store = ResultStore::new();
        self.controls = ControlResults::default();
        self.phase = RunPhase::NotStarted;

        let loaded = self
            .loader
            .load(&self.options.selection, self.options.limit)
            .await;
        self.lists_loaded = loaded.lists_loaded();
        self.used_fallback = loaded.used_fallback;

        // The run clock starts once the list is in hand and covers the controls
        let ctx = RunContext::new(self.options.settings, self.token.clone());
        let clock = Instant::now();

        if loaded.entries.is_empty() {
            logger.debug_sync("CheckSession", "nothing_to_check", "Domain list is empty");
            self.phase = RunPhase::NothingToCheck;
            return RunOutcome {
                report: RunReport::empty(&ctx),
                diagnostics: self.diagnostics(),
            };
        }

        self.phase = RunPhase::Started;
        self.controls = self.control.run(&ctx.token).await;

        let mut report = self
            .store
            .run(&self.scheduler, &ctx, loaded.entries, on_event)
            .await;
        report.duration_ms = clock.elapsed().as_millis() as u64;
        self.store.finish(&report);

        RunOutcome {
            report,
            diagnostics: self.diagnostics(),
        }
    }

    /// Re-probe only `fail`/`timeout` domains with the run's settings
    pub async fn retry_failed(&mut self, on_event: impl FnMut(&RunEvent)) -> RunOutcome {
        let ctx = RunContext::new(self.options.settings, self.token.clone());
        let report = self
            .store
            .retry_failed(&self.scheduler, &ctx, on_event)
            .await;
        RunOutcome {
            report,
            diagnostics: self.diagnostics(),
        }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Verdict for the current state
    pub fn diagnostics(&self) -> DiagnosticsState {
        let state = compute_diagnostics(
            &DiagnosticsInput {
                controls: self.controls,
                lists_loaded: self.lists_loaded,
                used_fallback_list: self.used_fallback,
                results: self.store.results(),
                phase: self.phase,
            },
            &self.options.thresholds,
        );
        get_debug_logger().diagnostics_summary(state.health_status.as_str(), state.ok_ratio);
        state
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn stats(&self) -> RunStats {
        self.store.stats()
    }

    pub fn category_stats(&self) -> Vec<CategoryStats> {
        self.store.category_stats()
    }

    pub fn controls(&self) -> ControlResults {
        self.controls
    }

    pub fn control_domains(&self) -> &ControlDomains {
        self.control.domains()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
