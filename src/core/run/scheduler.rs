/*!
Bounded-concurrency runner for probe chains.

`Scheduler::run` drives `ProbeChain` over a FIFO queue of domains with at most
K chains in flight. All workers are polled from the calling task, so there is
no parallel CPU work, only overlapped network waits. Results and progress are
emitted on an unbounded channel in completion order; the caller owns the
result collection and applies events one at a time.

## Cancellation points

- before a worker pulls the next domain
- before each probe attempt (inside the chain)
- after each probe attempt settles (inside the chain and again here)

A domain whose chain observed cancellation is dropped silently: no `Result`
event, no progress tick. Domains never pulled stay `pending`.
*/

use crate::core::debug_logger::get_debug_logger;
use tokio_util::sync::CancellationToken;
use crate::core::probe::chain::ProbeChain;
use crate::core::probe::types::{DomainCheckResult, DomainEntry};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

/// Default number of concurrent probe chains
pub const DEFAULT_CONCURRENCY: usize = 15;
/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 6000;

/// Throughput knobs shared by a run and its retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// K; values below 1 are treated as 1
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Everything one run needs, passed explicitly instead of living in globals
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub settings: RunSettings,
    pub token: CancellationToken,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(settings: RunSettings, token: CancellationToken) -> Self {
        Self {
            run_id: format!("run_{}", uuid::Uuid::new_v4()),
            settings,
            token,
            started_at: Utc::now(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Incremental run output
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// One domain reached a terminal status
    Result(DomainCheckResult),
    /// Emitted right after every `Result`; `done` never decreases
    Progress { done: usize, total: usize },
}

/// Summary returned when the scheduler stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: String,
    pub total: usize,
    /// Domains reported through `RunEvent::Result`
    pub done: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl RunReport {
    /// Report for a run that had nothing to do
    pub fn empty(ctx: &RunContext) -> Self {
        Self {
            run_id: ctx.run_id.clone(),
            total: 0,
            done: 0,
            cancelled: ctx.is_cancelled(),
            duration_ms: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.done == self.total
    }
}

/// Bounded-concurrency runner
#[derive(Clone)]
pub struct Scheduler {
    chain: ProbeChain,
}

impl Scheduler {
    pub fn new(chain: ProbeChain) -> Self {
        Self { chain }
    }

    /// Probe `domains` and stream results on `events`
    ///
    /// Duplicates are probed independently. Returns once the queue is drained
    /// or cancellation was observed and every in-flight chain unwound.
    pub async fn run(
        &self,
        ctx: &RunContext,
        domains: Vec<DomainEntry>,
        events: UnboundedSender<RunEvent>,
    ) -> RunReport {
        let logger = get_debug_logger();
        let start = Instant::now();
        let total = domains.len();
        let concurrency = ctx.settings.concurrency.max(1);

        logger.run_start(
            &ctx.run_id,
            total,
            concurrency,
            ctx.settings.timeout.as_millis() as u64,
        );

        let queue = Mutex::new(VecDeque::from(domains));
        let done = AtomicUsize::new(0);

        let workers = (0..concurrency.min(total))
            .map(|_| self.worker(ctx, &queue, &done, total, &events));
        join_all(workers).await;

        let report = RunReport {
            run_id: ctx.run_id.clone(),
            total,
            done: done.load(Ordering::SeqCst),
            cancelled: ctx.is_cancelled(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        logger.run_end(
            &report.run_id,
            report.done,
            report.total,
            report.cancelled,
            report.duration_ms,
        );

        report
    }

    async fn worker(
        &self,
        ctx: &RunContext,
        queue: &Mutex<VecDeque<DomainEntry>>,
        done: &AtomicUsize,
        total: usize,
        events: &UnboundedSender<RunEvent>,
    ) {
        let logger = get_debug_logger();

        loop {
            if ctx.is_cancelled() {
                return;
            }

            // Lock is released before the chain awaits
            let next = queue
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .pop_front();
            let Some(entry) = next else {
                return;
            };

            let outcome = self
                .chain
                .check(&entry.domain, ctx.settings.timeout, &ctx.token)
                .await;

            if ctx.is_cancelled() || !outcome.status.is_terminal() {
                return;
            }

            logger.domain_settled(
                &ctx.run_id,
                &entry.domain,
                outcome.status.as_str(),
                outcome.probe_used.map(|k| k.as_str()),
            );

            let result = DomainCheckResult {
                domain: entry.domain,
                category: entry.category,
                status: outcome.status,
                probe_used: outcome.probe_used,
                latency_ms: outcome.latency_ms,
                checked_at: Some(Utc::now()),
                details: outcome.details,
            };

            // No await between the increment and both sends keeps progress ordered
            let done_now = done.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = events.send(RunEvent::Result(result));
            let _ = events.send(RunEvent::Progress {
                done: done_now,
                total,
            });

            // Let the consumer apply the result before this worker pulls again
            tokio::task::yield_now().await;
        }
    }
}
