//! Walking GitHub's `link`-header pagination for the repository selector.
//!
//! Listing is all-or-nothing: a transport failure on any page discards what
//! was already collected and any error GitHub reports fails the whole call.

use http::header::LINK;
use http::HeaderMap;
use std::collections::HashSet;

use super::client::UpstreamClient;
use super::error::FetchError;
use super::types::{RawRepository, Repository};

/// Extract the `rel="next"` target from a `link` header
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(LINK)?.to_str().ok()?;
    parse_next_link(value)
}

/// Parse `<url>; rel="next", <url>; rel="last"` and return the next URL
pub fn parse_next_link(value: &str) -> Option<String> {
    value.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;

        let is_next = parts.any(|param| {
            let param = param.trim();
            match param.split_once('=') {
                Some((key, rel)) => {
                    key.trim() == "rel"
                        && rel
                            .trim()
                            .trim_matches('"')
                            .split_whitespace()
                            .any(|r| r == "next")
                }
                None => false,
            }
        });

        if is_next {
            Some(url.to_string())
        } else {
            None
        }
    })
}

/// List every repository the token's owner can see, following pagination
/// to the end.
///
/// Returns [`FetchError::Auth`] when GitHub rejects the token on any page
/// and [`FetchError::Upstream`] for any other error payload. A transport
/// failure yields an empty list, never a partial one.
pub async fn list_repositories(
    client: &UpstreamClient,
    token: &str,
) -> Result<Vec<Repository>, FetchError> {
    let mut repositories = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(client.repositories_url());
    let mut page = 0;

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            tracing::warn!(%url, "pagination link points at an already visited page, stopping");
            break;
        }
        page += 1;

        let response = match client.get_json::<Vec<RawRepository>>(&url, token).await {
            Ok(response) => response,
            Err(FetchError::Transport { message }) => {
                tracing::warn!(
                    page,
                    error = %message,
                    "repository listing failed mid-pagination, discarding {} collected entries",
                    repositories.len()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into_auth_if_bad_credentials()),
        };

        next = response.next_link();
        repositories.extend(response.body.into_iter().map(Repository::from));
    }

    tracing::debug!(pages = page, count = repositories.len(), "listed repositories");
    Ok(repositories)
}

/// Flag the repositories the caller already has selected
pub fn mark_selected(repositories: Vec<Repository>, selection: &[String]) -> Vec<Repository> {
    let selected: HashSet<&str> = selection.iter().map(|s| s.trim()).collect();
    repositories
        .into_iter()
        .map(|repo| Repository {
            selected: selected.contains(repo.full_name.as_str()),
            ..repo
        })
        .collect()
}

/// Keep the repositories whose name contains `needle`, ignoring case. An
/// empty needle keeps everything.
pub fn filter_repositories(repositories: Vec<Repository>, needle: &str) -> Vec<Repository> {
    if needle.is_empty() {
        return repositories;
    }
    let needle = needle.to_lowercase();
    repositories
        .into_iter()
        .filter(|repo| repo.full_name.to_lowercase().contains(&needle))
        .collect()
}
