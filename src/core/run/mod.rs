//! Bulk run machinery
//!
//! Scheduler, control checks, diagnostics, result store and the session that
//! ties them together.

pub mod control;
pub mod diagnostics;
pub mod scheduler;
pub mod session;
pub mod store;

pub use control::{ControlChecker, ControlDomains, ControlResults};
pub use diagnostics::{compute_diagnostics, DiagnosticsInput, DiagnosticsThresholds, RunPhase};
pub use scheduler::{RunContext, RunEvent, RunReport, RunSettings, Scheduler};
pub use session::{CheckSession, RunOutcome, SessionOptions};
pub use store::ResultStore;
