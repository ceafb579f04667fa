use serde::{Deserialize, Serialize};

use crate::fetch::DEFAULT_MAX_CONCURRENCY;

pub(super) const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub(super) const DEFAULT_AUTO_REFRESH_INTERVAL: u64 = 300;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Login used for reviewer matching; looked up from the token when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Selected repositories, "org/repo"
    #[serde(default)]
    pub repos: Vec<String>,
    /// API root, for GitHub Enterprise (e.g. https://ghe.example.com/api/v3)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-request timeout, humantime format ("30s", "1m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// Seconds between refreshes in --watch mode
    #[serde(default = "default_auto_refresh_interval")]
    pub auto_refresh_interval: u64,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_auto_refresh_interval() -> u64 {
    DEFAULT_AUTO_REFRESH_INTERVAL
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            repos: Vec::new(),
            api_base: None,
            max_concurrency: default_max_concurrency(),
            request_timeout: default_request_timeout(),
            auto_refresh_interval: default_auto_refresh_interval(),
        }
    }
}
