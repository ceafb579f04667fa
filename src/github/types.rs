use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::FetchError;

/// A pull request as GitHub returns it from the list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
    pub user: RawUser,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub requested_reviewers: Vec<RawUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
    #[serde(default)]
    pub state: Option<String>,
}

impl RawReview {
    pub fn is_approval(&self) -> bool {
        self.state.as_deref() == Some("APPROVED")
    }
}

/// Issue comments are only counted, so their contents are skipped
pub type RawComment = IgnoredAny;

#[derive(Debug, Clone, Deserialize)]
pub struct RawRepository {
    pub full_name: String,
}

/// An open pull request with everything derived for this pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub age: String,
    pub state: String,
    pub url: String,
    pub author: String,
    pub requested_reviewers: Vec<String>,
    pub is_reviewer_match: bool,
    pub is_draft: bool,
    pub comment_count: u32,
    pub approval_count: u32,
}

impl PullRequest {
    /// Return a short reference in the format "#123"
    pub fn short_ref(&self) -> String {
        format!("#{}", self.number)
    }
}

/// One repository's slot in an aggregation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPullRequests {
    pub org_name: String,
    pub repo_name: String,
    pub pull_requests: Vec<PullRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryPullRequests {
    pub fn empty(org_name: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            repo_name: repo_name.into(),
            pull_requests: Vec::new(),
            error: None,
        }
    }

    pub fn failed(key: &RepositoryKey, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty(&key.org, &key.repo)
        }
    }

    /// Return the key in the format "org/repo"
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org_name, self.repo_name)
    }
}

/// The token and identity a pass runs on behalf of
#[derive(Clone, Copy)]
pub struct Caller<'a> {
    pub token: &'a str,
    pub login: &'a str,
}

impl<'a> Caller<'a> {
    pub fn new(token: &'a str, login: &'a str) -> Self {
        Self { token, login }
    }
}

impl fmt::Debug for Caller<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("token", &"<redacted>")
            .field("login", &self.login)
            .finish()
    }
}

/// A validated "org/repo" pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryKey {
    pub org: String,
    pub repo: String,
}

impl RepositoryKey {
    /// Parse "org/repo". Surrounding whitespace is ignored; anything other
    /// than exactly two non-empty segments is rejected.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let parts: Vec<&str> = input.trim().split('/').collect();
        match parts.as_slice() {
            [org, repo] if !org.is_empty() && !repo.is_empty() => Ok(Self {
                org: org.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(FetchError::validation(format!(
                "expected \"org/repo\", got {:?}",
                input
            ))),
        }
    }
}

impl fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

/// A repository entry for a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub full_name: String,
    pub selected: bool,
}

impl From<RawRepository> for Repository {
    fn from(raw: RawRepository) -> Self {
        Self {
            full_name: raw.full_name,
            selected: false,
        }
    }
}
