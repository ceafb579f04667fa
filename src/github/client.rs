use anyhow::{Context, Result};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::error::FetchError;
use super::pagination::next_link;
use crate::config::Config;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Largest page GitHub serves; per-repository lists are read as one page
const PAGE_SIZE: u32 = 100;
const USER_AGENT: &str = concat!("pr-board/", env!("CARGO_PKG_VERSION"));

/// Authenticated fetch capability for the GitHub REST API.
///
/// The client holds no credential of its own: every call takes the token it
/// should act with, so one client can serve any number of callers.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

/// A decoded success payload plus the response headers
#[derive(Debug)]
pub struct UpstreamResponse<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: T,
}

impl<T> UpstreamResponse<T> {
    /// URL of the next page, if the `link` header advertises one
    pub fn next_link(&self) -> Option<String> {
        next_link(&self.headers)
    }
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::transport(format!("failed to build HTTP client: {}", e)))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// First page of repositories visible to the token's owner
    pub fn repositories_url(&self) -> String {
        format!("{}/user/repos?per_page={}", self.base_url, PAGE_SIZE)
    }

    pub fn open_pulls_url(&self, org: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}/pulls?state=open&per_page={}",
            self.base_url, org, repo, PAGE_SIZE
        )
    }

    pub fn comments_url(&self, org: &str, repo: &str, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments?per_page={}",
            self.base_url, org, repo, number, PAGE_SIZE
        )
    }

    pub fn reviews_url(&self, org: &str, repo: &str, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/reviews?per_page={}",
            self.base_url, org, repo, number, PAGE_SIZE
        )
    }

    pub fn viewer_url(&self) -> String {
        format!("{}/user", self.base_url)
    }

    /// GET `url` with `token` and decode the JSON body.
    ///
    /// An object body carrying `message` becomes [`FetchError::Upstream`]
    /// whatever the status code; network and decode failures become
    /// [`FetchError::Transport`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<UpstreamResponse<T>, FetchError> {
        tracing::debug!(url, "GET");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(http::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        let body = decode_payload(status, &bytes)?;
        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Split a response body into data or an upstream error by its shape
pub(crate) fn decode_payload<T: DeserializeOwned>(
    status: u16,
    bytes: &[u8],
) -> Result<T, FetchError> {
    let value: Value = serde_json::from_slice(bytes)?;

    if let Some(message) = error_message(&value) {
        return Err(FetchError::Upstream { status, message });
    }

    Ok(serde_json::from_value(value)?)
}

fn error_message(value: &Value) -> Option<String> {
    let message = value.as_object()?.get("message")?;
    Some(match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Create an upstream client from the loaded configuration
pub fn create_client(config: &Config) -> Result<UpstreamClient> {
    let timeout = config.request_timeout()?;
    UpstreamClient::new(config.api_base(), timeout).context("Failed to create GitHub client")
}

#[cfg(test)]
pub(crate) fn test_client(base_url: &str) -> UpstreamClient {
    test_client_with_timeout(base_url, Duration::from_secs(5))
}

#[cfg(test)]
pub(crate) fn test_client_with_timeout(base_url: &str, timeout: Duration) -> UpstreamClient {
    // Already-installed is fine, tests share one process
    let _ = rustls::crypto::ring::default_provider().install_default();
    UpstreamClient::new(base_url, timeout).unwrap()
}
