//! prdeps-github: GitHub pull request metadata for prdeps
//!
//! Implements [`prdeps_core::PullRequestSource`] over the GitHub REST API
//! with token authentication.

pub mod client;
pub mod error;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_URL};
pub use error::GithubError;

/// Result type for prdeps-github operations
pub type Result<T> = std::result::Result<T, GithubError>;
