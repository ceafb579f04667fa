//! Open pull requests across many GitHub repositories, each annotated with
//! its age, whether you are a requested reviewer, and its comment and
//! approval counts.
//!
//! [`fetch::aggregate`] is the entry point for PR data and
//! [`github::list_repositories`] feeds a repository picker. Neither reads
//! ambient state: the token and login are always passed in.

pub mod age;
pub mod config;
pub mod credentials;
mod fan_out;
pub mod fetch;
pub mod github;
pub mod logging;
pub mod output;

pub use fetch::{aggregate, AggregateOptions};
