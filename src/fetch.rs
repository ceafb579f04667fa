use chrono::{DateTime, Utc};

use crate::fan_out::ordered_fan_out;
use crate::github::pulls::{fetch_open_pulls, OpenPulls};
use crate::github::{
    enrich_all, Caller, FetchError, RepositoryKey, RepositoryPullRequests, UpstreamClient,
};

/// Default fan-out width for repositories and for PRs within a repository
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub max_concurrency: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// How a repository branch settled. Every outcome is terminal and still
/// produces a result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchOutcome {
    Skipped,
    Succeeded,
    Degraded,
    Failed,
}

/// Fetch and enrich the open PRs of every selected repository.
///
/// Never fails as a whole: the result has one entry per key, in the order
/// given. Malformed keys get an empty entry without touching the network,
/// and a repository GitHub refuses gets an entry carrying the error message.
///
/// This function is called from main.rs for one-shot runs and on every tick
/// of `--watch`.
pub async fn aggregate(
    client: &UpstreamClient,
    selection: &[String],
    caller: Caller<'_>,
    options: AggregateOptions,
) -> Vec<RepositoryPullRequests> {
    let now = Utc::now();
    let width = options.max_concurrency.max(1);

    ordered_fan_out(selection, width, |key| {
        aggregate_repository(client, key, caller, now, width)
    })
    .await
}

async fn aggregate_repository(
    client: &UpstreamClient,
    input: &str,
    caller: Caller<'_>,
    now: DateTime<Utc>,
    width: usize,
) -> RepositoryPullRequests {
    let (result, outcome) = run_branch(client, input, caller, now, width).await;
    tracing::debug!(
        repo = input,
        ?outcome,
        pull_requests = result.pull_requests.len(),
        "repository settled"
    );
    result
}

async fn run_branch(
    client: &UpstreamClient,
    input: &str,
    caller: Caller<'_>,
    now: DateTime<Utc>,
    width: usize,
) -> (RepositoryPullRequests, BranchOutcome) {
    let key = match RepositoryKey::parse(input) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed repository");
            return (malformed_entry(input), BranchOutcome::Skipped);
        }
    };

    match fetch_open_pulls(client, &key.org, &key.repo, caller.token).await {
        Ok(OpenPulls::Fetched(raw_pulls)) => {
            let pull_requests = enrich_all(client, raw_pulls, &key, caller, now, width).await;
            let result = RepositoryPullRequests {
                pull_requests,
                ..RepositoryPullRequests::empty(&key.org, &key.repo)
            };
            (result, BranchOutcome::Succeeded)
        }
        Ok(OpenPulls::Degraded) => (
            RepositoryPullRequests::empty(&key.org, &key.repo),
            BranchOutcome::Degraded,
        ),
        Err(e) => {
            if e.is_bad_credentials() {
                tracing::warn!(repo = %key, "GitHub rejected the token");
            } else {
                tracing::warn!(repo = %key, error = %e, "failed to fetch pull requests");
            }
            let message = match &e {
                FetchError::Upstream { message, .. } => message.clone(),
                other => other.to_string(),
            };
            (RepositoryPullRequests::failed(&key, message), BranchOutcome::Failed)
        }
    }
}

/// Empty slot for a key that is not "org/repo", keeping whatever segments
/// were there so the caller can still tell which input it was
fn malformed_entry(input: &str) -> RepositoryPullRequests {
    let mut parts = input.trim().splitn(2, '/');
    let org = parts.next().unwrap_or_default();
    let repo = parts.next().unwrap_or_default();
    RepositoryPullRequests::empty(org, repo)
}
