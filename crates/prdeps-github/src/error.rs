//! Error types for prdeps-github

use prdeps_core::PrDepsError;
use thiserror::Error;

/// Errors that can occur talking to the GitHub API
#[derive(Error, Debug)]
pub enum GithubError {
    /// No token configured
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status
    #[error("GET {url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Http(err.to_string())
    }
}

impl From<GithubError> for PrDepsError {
    fn from(err: GithubError) -> Self {
        PrDepsError::Source(err.to_string())
    }
}
