//! Domain Probing Module
//!
//! Reachability checks for a single domain:
//! - Icon-resource probes that cannot be satisfied by an error or block page
//! - HEAD/GET fallbacks as weaker evidence
//! - A chain state machine that turns the attempts into one verdict

pub mod chain;
pub mod client;
pub mod strategy;
pub mod types;
pub mod url;

pub use chain::{ChainOutcome, ProbeChain};
pub use client::{ProbeClient, ProbeError, ProbeMethod, ProbeRequest, ProbeResponse};
pub use strategy::{IconProbe, ProbeStrategy, RequestProbe};
pub use types::*;

/// Shared by one run; cancelling never aborts an in-flight request
pub use tokio_util::sync::CancellationToken;

#[cfg(feature = "network-probes")]
pub use client::IsahcProbeClient;
