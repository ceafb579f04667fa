use chrono::{DateTime, Utc};

use super::client::UpstreamClient;
use super::error::FetchError;
use super::types::{Caller, PullRequest, RawComment, RawPullRequest, RawReview, RepositoryKey};
use crate::age::age_label;
use crate::fan_out::ordered_fan_out;

/// Count the issue comments on a PR
async fn fetch_comment_count(
    client: &UpstreamClient,
    key: &RepositoryKey,
    number: u64,
    token: &str,
) -> Result<u32, FetchError> {
    let url = client.comments_url(&key.org, &key.repo, number);
    let response = client.get_json::<Vec<RawComment>>(&url, token).await?;
    Ok(response.body.len() as u32)
}

/// Count the reviews on a PR whose state is APPROVED
async fn fetch_approval_count(
    client: &UpstreamClient,
    key: &RepositoryKey,
    number: u64,
    token: &str,
) -> Result<u32, FetchError> {
    let url = client.reviews_url(&key.org, &key.repo, number);
    let response = client.get_json::<Vec<RawReview>>(&url, token).await?;
    Ok(response.body.iter().filter(|review| review.is_approval()).count() as u32)
}

/// Counts are annotations, not data: a failure becomes 0 and a log line
fn count_or_zero(result: Result<u32, FetchError>, what: &str, key: &RepositoryKey, number: u64) -> u32 {
    result.unwrap_or_else(|e| {
        tracing::warn!(repo = %key, number, error = %e, "failed to fetch {}, counting 0", what);
        0
    })
}

/// Build the enriched PR: age and reviewer match are computed locally,
/// comment and approval counts are fetched concurrently.
pub async fn enrich_pull_request(
    client: &UpstreamClient,
    raw: RawPullRequest,
    key: &RepositoryKey,
    caller: Caller<'_>,
    now: DateTime<Utc>,
) -> PullRequest {
    let (comments, approvals) = tokio::join!(
        fetch_comment_count(client, key, raw.number, caller.token),
        fetch_approval_count(client, key, raw.number, caller.token),
    );

    let requested_reviewers: Vec<String> = raw
        .requested_reviewers
        .into_iter()
        .map(|user| user.login)
        .collect();
    let is_reviewer_match = requested_reviewers.iter().any(|login| login == caller.login);

    PullRequest {
        number: raw.number,
        age: age_label(raw.created_at, now),
        created_at: raw.created_at,
        title: raw.title,
        state: raw.state,
        url: raw.html_url,
        author: raw.user.login,
        requested_reviewers,
        is_reviewer_match,
        is_draft: raw.draft,
        comment_count: count_or_zero(comments, "comment count", key, raw.number),
        approval_count: count_or_zero(approvals, "approval count", key, raw.number),
    }
}

/// Enrich every PR of a repository, at most `max_concurrent` at a time,
/// keeping the upstream order
pub async fn enrich_all(
    client: &UpstreamClient,
    raw_pulls: Vec<RawPullRequest>,
    key: &RepositoryKey,
    caller: Caller<'_>,
    now: DateTime<Utc>,
    max_concurrent: usize,
) -> Vec<PullRequest> {
    ordered_fan_out(raw_pulls, max_concurrent, |raw| {
        enrich_pull_request(client, raw, key, caller, now)
    })
    .await
}
