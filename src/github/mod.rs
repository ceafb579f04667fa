pub mod client;
pub mod enrich;
pub mod error;
pub mod pagination;
pub mod pulls;
pub mod types;
pub mod user;

pub use client::{create_client, UpstreamClient, UpstreamResponse, DEFAULT_API_BASE};
pub use enrich::{enrich_all, enrich_pull_request};
pub use error::FetchError;
pub use pagination::{filter_repositories, list_repositories, mark_selected};
pub use pulls::fetch_open_pull_requests;
pub use types::{Caller, PullRequest, RawPullRequest, Repository, RepositoryKey, RepositoryPullRequests};
pub use user::fetch_viewer_login;
