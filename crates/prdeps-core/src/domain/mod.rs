//! Domain types shared by every prdeps crate.

pub mod error;
pub mod overrides;
pub mod pull_request;

pub use error::{PrDepsError, Result};
pub use overrides::{ComponentOverride, OverrideSet, RepoRef};
pub use pull_request::{HeadRepo, IssueComment, PullRequest, PullRequestHead};
