pub mod defaults;
pub mod loader;
pub mod types;

pub use defaults::{DEFAULT_DOMAIN_LIMIT, DEFAULT_OK_THRESHOLD_PERCENT};
pub use loader::{default_config_path, resolve_config_path};
pub use types::{AppConfig, ConfigError, ThresholdsConfig};
