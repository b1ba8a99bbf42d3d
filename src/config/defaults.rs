// Built-in configuration values

use super::types::{AppConfig, ThresholdsConfig};
use crate::core::probe::types::Category;
use crate::core::run::control::{ControlDomains, DEFAULT_CONTROL_TIMEOUT_MS};
use crate::core::run::scheduler::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS};
use crate::sources::presets::DEFAULT_PRESET_ID;

pub const DEFAULT_OK_THRESHOLD_PERCENT: u8 = 85;
pub const DEFAULT_DOMAIN_LIMIT: usize = 120;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            control_timeout_ms: DEFAULT_CONTROL_TIMEOUT_MS,
            ok_threshold_percent: DEFAULT_OK_THRESHOLD_PERCENT,
            domain_limit: DEFAULT_DOMAIN_LIMIT,
            categories: Category::ALL.to_vec(),
            preset: DEFAULT_PRESET_ID.to_string(),
            custom_source_url: String::new(),
            fallback_list_path: String::new(),
            allowed_list_path: String::new(),
            snapshot_path: String::new(),
            thresholds: ThresholdsConfig::default(),
            control: ControlDomains::default(),
        }
    }
}
