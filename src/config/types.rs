use crate::core::probe::types::Category;
use crate::core::run::control::ControlDomains;
use crate::core::run::diagnostics::DiagnosticsThresholds;
use crate::core::run::scheduler::RunSettings;
use crate::sources::loader::ListSelection;
use crate::sources::presets::find_preset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Concurrent probe chains (K)
    pub concurrency: usize,
    /// Per-attempt timeout for the bulk run
    pub timeout_ms: u64,
    pub control_timeout_ms: u64,
    /// Ok-ratio threshold in percent
    pub ok_threshold_percent: u8,
    pub domain_limit: usize,
    /// Category mix; empty selects the single-list mode below
    pub categories: Vec<Category>,
    pub preset: String,
    pub custom_source_url: String,
    pub fallback_list_path: String,
    pub allowed_list_path: String,
    pub snapshot_path: String,
    pub thresholds: ThresholdsConfig,
    pub control: ControlDomains,
}

/// Empirical diagnostics ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub other_connectivity_ratio: f64,
    pub majority_ratio: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        let defaults = DiagnosticsThresholds::default();
        Self {
            other_connectivity_ratio: defaults.other_connectivity_ratio,
            majority_ratio: defaults.majority_ratio,
        }
    }
}

impl AppConfig {
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            concurrency: self.concurrency,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.control_timeout_ms)
    }

    pub fn diagnostics_thresholds(&self) -> DiagnosticsThresholds {
        DiagnosticsThresholds {
            other_connectivity_ratio: self.thresholds.other_connectivity_ratio,
            majority_ratio: self.thresholds.majority_ratio,
            ..DiagnosticsThresholds::with_ok_percent(self.ok_threshold_percent)
        }
    }

    /// Category mix when categories are set, otherwise the preset or custom URL
    pub fn list_selection(&self) -> ListSelection {
        if !self.categories.is_empty() {
            return ListSelection::Categories(self.categories.clone());
        }
        let preset = find_preset(&self.preset);
        let custom = self.custom_source_url.trim();
        ListSelection::Single {
            preset_url: preset.map(|p| p.url()),
            custom_url: (!custom.is_empty()).then(|| custom.to_string()),
            category: preset.and_then(|p| p.category),
        }
    }

    pub fn fallback_list(&self) -> Option<PathBuf> {
        non_blank_path(&self.fallback_list_path)
    }

    pub fn allowed_list(&self) -> Option<PathBuf> {
        non_blank_path(&self.allowed_list_path)
    }

    pub fn snapshot(&self) -> Option<PathBuf> {
        non_blank_path(&self.snapshot_path)
    }
}

fn non_blank_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid value for {key}: {message}")]
    Env { key: String, message: String },
    #[error("invalid configuration: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("could not determine the home directory")]
    NoHomeDir,
}
