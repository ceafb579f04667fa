mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::AggregateOptions;
use crate::github::DEFAULT_API_BASE;

/// Get the config directory path (~/.config/pr-board/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pr-board")
}

/// Get the default config file path (~/.config/pr-board/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

impl Config {
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .filter(|base| !base.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(self.request_timeout.trim()).with_context(|| {
            format!(
                "Invalid request_timeout {:?} (expected e.g. \"30s\" or \"1m\")",
                self.request_timeout
            )
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_interval)
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            max_concurrency: self.max_concurrency,
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            anyhow::bail!("max_concurrency must be at least 1");
        }
        if self.auto_refresh_interval == 0 {
            anyhow::bail!("auto_refresh_interval must be at least 1 second");
        }
        if self.request_timeout()?.is_zero() {
            anyhow::bail!("request_timeout must be greater than zero");
        }
        Ok(())
    }
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/pr-board/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or holds invalid values
///
/// A missing file at the default path is not an error: every field has a
/// default and repositories can be passed on the command line.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)?
        }
        None => {
            let default_path = get_config_path();
            if default_path.exists() {
                read_config(&default_path)?
            } else {
                Config::default()
            }
        }
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_config(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}
