//! Domain list sources
//!
//! Parsing, built-in presets, list loading with fallbacks and the reference
//! snapshot.

pub mod loader;
pub mod parsing;
pub mod presets;
pub mod snapshot;

pub use loader::{DomainListLoader, ListFetcher, ListSelection, LoadedList, SourceError};
pub use parsing::{extract_domain, filter_excluded, parse_domain_list};
pub use presets::{find_preset, Preset, PRESETS};
pub use snapshot::{Snapshot, SnapshotError, SnapshotInfo, SnapshotStatus};
