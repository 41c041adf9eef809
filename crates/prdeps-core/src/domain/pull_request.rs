//! The subset of GitHub pull request payloads prdeps reads.

use serde::{Deserialize, Serialize};

use super::error::{PrDepsError, Result};
use super::overrides::ComponentOverride;

/// A pull request as returned by `GET /repos/{owner}/{repo}/pulls/{n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub comments_url: Option<String>,
    pub head: PullRequestHead,
}

impl PullRequest {
    /// The PR's own head branch, expressed as an override for the component
    /// named after the head repository.
    ///
    /// Fails when the head repository is gone (e.g. a deleted fork).
    pub fn head_override(&self) -> Result<ComponentOverride> {
        let repo = self.head.repo.as_ref().ok_or_else(|| {
            PrDepsError::Source(format!(
                "PR #{} head repository no longer exists",
                self.number
            ))
        })?;
        Ok(ComponentOverride::new(
            &repo.name,
            &repo.full_name,
            &self.head.git_ref,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// `null` once the head repository has been deleted.
    pub repo: Option<HeadRepo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRepo {
    /// Short repository name, e.g. `jitsi-videobridge`.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
}

/// A pull request (issue) comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
