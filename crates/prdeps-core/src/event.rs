//! GitHub Actions event payload loading and trigger classification.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::error::{PrDepsError, Result};

/// PR actions that trigger a build.
pub const PR_BUILD_ACTIONS: [&str; 4] = ["synchronize", "opened", "edited", "reopened"];

/// Comment actions that trigger a build.
pub const COMMENT_BUILD_ACTIONS: [&str; 2] = ["created", "edited"];

/// The fields of a workflow event payload that prdeps consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_request: Option<EventPullRequest>,
    #[serde(default)]
    pub issue: Option<EventIssue>,
    #[serde(default)]
    pub comment: Option<EventComment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPullRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "_links")]
    pub links: Option<PullRequestLinks>,
}

impl EventPullRequest {
    /// API URL of the PR, preferring `_links.self.href`.
    pub fn api_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .map(|l| l.self_link.href.as_str())
            .or(self.url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventIssue {
    #[serde(default)]
    pub number: Option<u64>,
    /// Present only when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<IssuePullRequestLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePullRequestLink {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventComment {
    #[serde(default)]
    pub body: Option<String>,
}

/// What caused this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A PR was opened, pushed to, edited or reopened.
    PullRequest { action: String, pr_url: String },
    /// Someone commented on a PR.
    PullRequestComment {
        pr_url: String,
        comment_body: String,
    },
    /// Anything else; the run stops without building.
    Unsupported { action: String },
}

impl Trigger {
    pub fn pr_url(&self) -> Option<&str> {
        match self {
            Trigger::PullRequest { pr_url, .. } | Trigger::PullRequestComment { pr_url, .. } => {
                Some(pr_url)
            }
            Trigger::Unsupported { .. } => None,
        }
    }
}

impl GithubEvent {
    /// Read and deserialize the event payload at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PrDepsError::Event(format!("cannot read event file {}: {e}", path.display()))
        })?;
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            PrDepsError::Event(format!("malformed event file {}: {e}", path.display()))
        })?;
        info!(event = %value, "loaded event info");
        serde_json::from_value(value)
            .map_err(|e| PrDepsError::Event(format!("unexpected event shape: {e}")))
    }

    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }

    /// Decide which PR this event refers to, if any.
    pub fn trigger(&self) -> Trigger {
        let action = self.action().to_string();

        if let Some(pr_url) = self.pull_request.as_ref().and_then(|pr| pr.api_url()) {
            if PR_BUILD_ACTIONS.contains(&action.as_str()) {
                return Trigger::PullRequest {
                    action,
                    pr_url: pr_url.to_string(),
                };
            }
            return Trigger::Unsupported { action };
        }

        let issue_pr = self
            .issue
            .as_ref()
            .and_then(|issue| issue.pull_request.as_ref());
        if let (Some(link), Some(comment)) = (issue_pr, self.comment.as_ref()) {
            if COMMENT_BUILD_ACTIONS.contains(&action.as_str()) {
                return Trigger::PullRequestComment {
                    pr_url: link.url.clone(),
                    comment_body: comment.body.clone().unwrap_or_default(),
                };
            }
        }

        Trigger::Unsupported { action }
    }
}
