use super::types::{AppConfig, ConfigError};
use std::path::{Path, PathBuf};

/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "REACHSCAN_CONFIG";
pub const CONCURRENCY_ENV: &str = "REACHSCAN_CONCURRENCY";
pub const TIMEOUT_ENV: &str = "REACHSCAN_TIMEOUT_MS";
pub const THRESHOLD_ENV: &str = "REACHSCAN_THRESHOLD";

/// `~/.reachscan/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".reachscan").join("config.toml"))
}

/// Explicit path, then `REACHSCAN_CONFIG`, then the default location
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path.trim())),
        _ => default_config_path(),
    }
}

impl AppConfig {
    /// Effective configuration: defaults, then file, then environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = resolve_config_path(explicit)?;
        let mut config = Self::load_from(&path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `REACHSCAN_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; blank values are ignored
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = env_value(&lookup, CONCURRENCY_ENV)? {
            self.concurrency = value;
        }
        if let Some(value) = env_value(&lookup, TIMEOUT_ENV)? {
            self.timeout_ms = value;
        }
        if let Some(value) = env_value(&lookup, THRESHOLD_ENV)? {
            self.ok_threshold_percent = value;
        }
        Ok(())
    }

    /// Collect every invalid field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.concurrency == 0 {
            errors.push("concurrency must be at least 1".to_string());
        }
        if self.timeout_ms == 0 {
            errors.push("timeout_ms must be greater than 0".to_string());
        }
        if self.control_timeout_ms == 0 {
            errors.push("control_timeout_ms must be greater than 0".to_string());
        }
        if self.ok_threshold_percent > 100 {
            errors.push("ok_threshold_percent must be within 0..=100".to_string());
        }
        if self.domain_limit == 0 {
            errors.push("domain_limit must be at least 1".to_string());
        }
        for (name, ratio) in [
            ("thresholds.other_connectivity_ratio", self.thresholds.other_connectivity_ratio),
            ("thresholds.majority_ratio", self.thresholds.majority_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                errors.push(format!("{} must be within 0.0..=1.0", name));
            }
        }
        if self.categories.is_empty()
            && self.custom_source_url.trim().is_empty()
            && crate::sources::presets::find_preset(&self.preset).is_none()
        {
            errors.push(format!("unknown preset: {}", self.preset));
        }
        if self.control.primary.trim().is_empty() || self.control.list_host.trim().is_empty() {
            errors.push("control domains must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Write the default configuration to `path` unless a file already exists
    ///
    /// Returns whether a file was written.
    pub fn init(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = Self::default().to_toml_string()?;
        std::fs::write(path, content).map_err(io_error)?;
        Ok(true)
    }

    pub fn print(&self) -> Result<(), ConfigError> {
        println!("{}", self.to_toml_string()?);
        Ok(())
    }
}

fn env_value<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>().map(Some).map_err(|e| ConfigError::Env {
        key: key.to_string(),
        message: e.to_string(),
    })
}
