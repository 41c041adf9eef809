//! Where pull request metadata comes from.

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::pull_request::{IssueComment, PullRequest};

/// Fetches pull requests and their comments by API URL.
///
/// The GitHub REST client implements this; tests use
/// [`crate::fakes::MemoryPullRequestSource`].
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn pull_request(&self, url: &str) -> Result<PullRequest>;

    /// Comments at `url`, oldest first.
    async fn comments(&self, url: &str) -> Result<Vec<IssueComment>>;
}
