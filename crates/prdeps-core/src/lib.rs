//! prdeps Core Library
//!
//! Everything needed to go from a GitHub event to checked-out components:
//! - event loading and trigger classification
//! - `deps:` directive parsing
//! - the fixed component build order
//! - git checkout through a pluggable [`process::CommandRunner`]
//! - per-component log files and tracing setup

pub mod components;
pub mod config;
pub mod deps;
pub mod discovery;
pub mod domain;
pub mod event;
pub mod fakes;
pub mod git;
pub mod logfile;
pub mod process;
pub mod source;
pub mod telemetry;

pub use components::{BuildOrder, BuildPlan, BuildStep, DEFAULT_BUILD_ORDER};
pub use config::Settings;
pub use deps::{extract_deps_block, parse_deps, parse_directive};
pub use discovery::{discover_overrides, DirectiveOrigin, Discovery};
pub use domain::{
    ComponentOverride, HeadRepo, IssueComment, OverrideSet, PrDepsError, PullRequest,
    PullRequestHead, RepoRef, Result,
};
pub use event::{GithubEvent, Trigger};
pub use git::{checkout_all, clone_shallow, diff_worktree};
pub use logfile::ComponentLog;
pub use process::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use source::PullRequestSource;
pub use telemetry::init_tracing;
