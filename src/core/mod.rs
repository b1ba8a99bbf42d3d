pub mod debug_logger;
pub mod probe;
pub mod run;

pub use probe::{CancellationToken, ProbeChain};
pub use run::{CheckSession, ResultStore, Scheduler};
