use super::client::UpstreamClient;
use super::error::FetchError;
use super::types::RawPullRequest;

/// What the open-PR endpoint gave back for one repository
#[derive(Debug)]
pub(crate) enum OpenPulls {
    Fetched(Vec<RawPullRequest>),
    /// The request failed in transit; stands in for an empty list
    Degraded,
}

impl OpenPulls {
    pub(crate) fn into_pulls(self) -> Vec<RawPullRequest> {
        match self {
            OpenPulls::Fetched(pulls) => pulls,
            OpenPulls::Degraded => Vec::new(),
        }
    }
}

/// Fetch the open pull requests of one repository.
///
/// Empty `org` or `repo` is rejected before any request. A transport
/// failure degrades to an empty list; an error payload from GitHub is
/// returned as-is so the caller can show it (or ask for a new token).
pub async fn fetch_open_pull_requests(
    client: &UpstreamClient,
    org: &str,
    repo: &str,
    token: &str,
) -> Result<Vec<RawPullRequest>, FetchError> {
    Ok(fetch_open_pulls(client, org, repo, token).await?.into_pulls())
}

/// Same as [`fetch_open_pull_requests`] but keeps a degraded list apart
/// from a genuinely empty one
pub(crate) async fn fetch_open_pulls(
    client: &UpstreamClient,
    org: &str,
    repo: &str,
    token: &str,
) -> Result<OpenPulls, FetchError> {
    if org.is_empty() {
        return Err(FetchError::validation("missing org"));
    }
    if repo.is_empty() {
        return Err(FetchError::validation("missing repo"));
    }

    let url = client.open_pulls_url(org, repo);
    match client.get_json::<Vec<RawPullRequest>>(&url, token).await {
        Ok(response) => Ok(OpenPulls::Fetched(response.body)),
        Err(FetchError::Transport { message }) => {
            tracing::warn!(org, repo, error = %message, "could not fetch pull requests, treating as empty");
            Ok(OpenPulls::Degraded)
        }
        Err(e) => Err(e),
    }
}
