use crate::config::AppConfig;
use crate::core::probe::types::Category;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reachscan")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Domain reachability prober with network health diagnostics")]
pub struct Cli {
    /// Config file (default: ~/.reachscan/config.toml, or REACHSCAN_CONFIG)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the configured domain lists (default)
    Run(RunArgs),
    /// Walk the probe chain for one domain, printing every step
    Probe {
        domain: String,
        /// Per-attempt timeout in milliseconds
        #[arg(long = "timeout-ms")]
        timeout_ms: Option<u64>,
    },
    /// List the built-in list presets
    Presets,
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Write the default configuration file
    Init,
    /// Print the effective configuration
    Print,
    /// Validate the configuration
    Check,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Maximum number of domains to check
    #[arg(long = "limit")]
    pub limit: Option<usize>,

    /// Concurrent probe chains
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Per-attempt timeout in milliseconds
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Ok-ratio threshold in percent
    #[arg(long = "threshold", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Category to include (repeatable)
    #[arg(long = "category", value_parser = parse_category)]
    pub categories: Vec<Category>,

    /// Check a single preset list instead of the category mix
    #[arg(long = "preset", conflicts_with = "source_url")]
    pub preset: Option<String>,

    /// Check a list downloaded from this URL
    #[arg(long = "source-url")]
    pub source_url: Option<String>,

    /// Write a JSON export of the run
    #[arg(long = "export")]
    pub export: Option<PathBuf>,

    /// Re-check failed and timed-out domains once after the run
    #[arg(long = "retry-failed")]
    pub retry_failed: bool,

    /// Reference snapshot JSON
    #[arg(long = "snapshot")]
    pub snapshot: Option<PathBuf>,

    /// Only print the summary
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl RunArgs {
    /// Flags win over file and environment values
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(limit) = self.limit {
            config.domain_limit = limit;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(threshold) = self.threshold {
            config.ok_threshold_percent = threshold;
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot_path = snapshot.display().to_string();
        }

        // A single-list flag switches off the category mix
        if let Some(preset) = &self.preset {
            config.preset = preset.clone();
            config.custom_source_url.clear();
            config.categories.clear();
        } else if let Some(url) = &self.source_url {
            config.custom_source_url = url.clone();
            config.categories.clear();
        } else if !self.categories.is_empty() {
            config.categories = self.categories.clone();
        }
    }
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
