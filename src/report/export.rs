//! JSON export of a run
//!
//! Document shape: `{exportedAt, stats, diagnostics, results, snapshotInfo}`.
//! `stats` is always recomputable from `results`.

use crate::core::probe::types::{DiagnosticsState, DomainCheckResult, RunStats};
use crate::sources::snapshot::SnapshotInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write export {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub stats: RunStats,
    pub diagnostics: DiagnosticsState,
    pub results: Vec<DomainCheckResult>,
    #[serde(default)]
    pub snapshot_info: SnapshotInfo,
}

impl ExportDocument {
    pub fn new(
        stats: RunStats,
        diagnostics: DiagnosticsState,
        results: Vec<DomainCheckResult>,
        snapshot_info: SnapshotInfo,
    ) -> Self {
        Self {
            exported_at: Utc::now(),
            stats,
            diagnostics,
            results,
            snapshot_info,
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stats derived from `results`, keeping the exported timing fields
    pub fn recomputed_stats(&self) -> RunStats {
        RunStats::from_results(&self.results, self.stats.started_at, self.stats.duration_ms)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
