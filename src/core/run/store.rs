//! Keyed result collection
//!
//! `ResultStore` is the single owner of per-domain results. It consumes
//! `RunEvent`s one at a time from the scheduler channel, so there is never
//! more than one writer.

use crate::core::probe::types::{
    Category, CategoryStats, CheckStatus, DomainCheckResult, DomainEntry, RunStats,
};
use crate::core::run::scheduler::{RunContext, RunEvent, RunReport, Scheduler};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Results keyed by domain, in first-seen order
#[derive(Debug, Default)]
pub struct ResultStore {
    results: Vec<DomainCheckResult>,
    index: HashMap<String, usize>,
    started_at: Option<DateTime<Utc>>,
    duration_ms: Option<u64>,
    done: usize,
    total: usize,
    cancelled: bool,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with one `pending` record per domain
    ///
    /// Duplicate domains share one record; the scheduler still probes each copy.
    pub fn begin_run(&mut self, entries: &[DomainEntry], started_at: DateTime<Utc>) {
        self.results.clear();
        self.index.clear();
        for entry in entries {
            self.install(DomainCheckResult::pending(entry));
        }
        self.started_at = Some(started_at);
        self.duration_ms = None;
        self.done = 0;
        self.total = entries.len();
        self.cancelled = false;
    }

    /// Last write wins; a result without a category keeps the stored one
    pub fn install(&mut self, mut result: DomainCheckResult) {
        match self.index.get(&result.domain) {
            Some(&slot) => {
                if result.category.is_none() {
                    result.category = self.results[slot].category;
                }
                self.results[slot] = result;
            }
            None => {
                self.index.insert(result.domain.clone(), self.results.len());
                self.results.push(result);
            }
        }
    }

    pub fn apply(&mut self, event: RunEvent) {
        match event {
            RunEvent::Result(result) => self.install(result),
            RunEvent::Progress { done, total } => {
                self.done = self.done.max(done);
                self.total = total;
            }
        }
    }

    /// Record how the run ended
    pub fn finish(&mut self, report: &RunReport) {
        self.duration_ms = Some(report.duration_ms);
        self.cancelled = report.cancelled;
    }

    pub fn results(&self) -> &[DomainCheckResult] {
        &self.results
    }

    pub fn get(&self, domain: &str) -> Option<&DomainCheckResult> {
        self.index.get(domain).map(|&slot| &self.results[slot])
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn stats(&self) -> RunStats {
        RunStats::from_results(&self.results, self.started_at, self.duration_ms)
    }

    /// Per-category breakdown, in category order, skipping empty categories
    pub fn category_stats(&self) -> Vec<CategoryStats> {
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                let mut stats = CategoryStats {
                    category,
                    ok: 0,
                    fail: 0,
                    timeout: 0,
                    total: 0,
                    done: 0,
                };
                for result in self.results.iter().filter(|r| r.category == Some(category)) {
                    stats.total += 1;
                    match result.status {
                        CheckStatus::Ok => stats.ok += 1,
                        CheckStatus::Fail => stats.fail += 1,
                        CheckStatus::Timeout => stats.timeout += 1,
                        CheckStatus::Pending => continue,
                    }
                    stats.done += 1;
                }
                (stats.total > 0).then_some(stats)
            })
            .collect()
    }

    /// Entries a retry would re-submit
    pub fn failed_entries(&self) -> Vec<DomainEntry> {
        self.results
            .iter()
            .filter(|r| r.status.is_failure())
            .map(DomainCheckResult::entry)
            .collect()
    }

    /// `(done, total)` of the latest run or retry
    pub fn progress(&self) -> (usize, usize) {
        (self.done, self.total)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Start a fresh run over `entries` and collect its results
    pub async fn run(
        &mut self,
        scheduler: &Scheduler,
        ctx: &RunContext,
        entries: Vec<DomainEntry>,
        on_event: impl FnMut(&RunEvent),
    ) -> RunReport {
        self.begin_run(&entries, ctx.started_at);
        let report = self.drive(scheduler, ctx, entries, on_event).await;
        self.finish(&report);
        report
    }

    /// Re-submit only `fail`/`timeout` entries through the same scheduler
    ///
    /// Other entries are left untouched. Retried entries keep their previous
    /// record until the new one arrives, and keep it if the retry is cancelled
    /// first.
    pub async fn retry_failed(
        &mut self,
        scheduler: &Scheduler,
        ctx: &RunContext,
        on_event: impl FnMut(&RunEvent),
    ) -> RunReport {
        let entries = self.failed_entries();
        if entries.is_empty() {
            return RunReport::empty(ctx);
        }

        self.started_at = Some(ctx.started_at);
        self.duration_ms = None;
        self.done = 0;
        self.total = entries.len();
        self.cancelled = false;

        let report = self.drive(scheduler, ctx, entries, on_event).await;
        self.finish(&report);
        report
    }

    async fn drive(
        &mut self,
        scheduler: &Scheduler,
        ctx: &RunContext,
        entries: Vec<DomainEntry>,
        mut on_event: impl FnMut(&RunEvent),
    ) -> RunReport {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut applied = 0;

        let consume = async {
            while let Some(event) = rx.recv().await {
                // Events raced past the cancellation point are discarded
                if ctx.is_cancelled() {
                    continue;
                }
                if matches!(event, RunEvent::Result(_)) {
                    applied += 1;
                }
                on_event(&event);
                self.apply(event);
            }
        };

        let (mut report, ()) = tokio::join!(scheduler.run(ctx, entries, tx), consume);

        // The scheduler may finish before the last events are consumed
        report.done = applied;
        report.cancelled = report.cancelled || ctx.is_cancelled();
        report
    }
}
