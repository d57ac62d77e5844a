// GitHub API module.
// Provides the client, endpoint adapters, and types for the gists REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use endpoints::{GistCommits, PublicGists};
pub use types::*;
