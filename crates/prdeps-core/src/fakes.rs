//! In-memory fakes for the runner and PR source traits (testing only)
//!
//! Provides `ScriptedRunner` and `MemoryPullRequestSource`, which satisfy the
//! trait contracts without spawning processes or touching the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::error::{PrDepsError, Result};
use crate::domain::pull_request::{IssueComment, PullRequest};
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::source::PullRequestSource;

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    SpawnError(String),
}

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    arg_contains: Option<String>,
    reply: Reply,
}

impl Rule {
    fn matches(&self, spec: &CommandSpec) -> bool {
        if self.program != spec.program {
            return false;
        }
        match &self.arg_contains {
            Some(needle) => spec.args.iter().any(|a| a.contains(needle.as_str())),
            None => true,
        }
    }
}

/// Records every command and replies from a script.
///
/// Rules with an argument filter are checked before program-only rules;
/// within each group the first registered match wins. Unscripted commands
/// succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `output` to any invocation of `program`.
    pub fn respond(mut self, program: &str, output: CommandOutput) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            arg_contains: None,
            reply: Reply::Output(output),
        });
        self
    }

    /// Reply with `output` when `program` runs with an argument containing
    /// `needle`.
    pub fn respond_when(mut self, program: &str, needle: &str, output: CommandOutput) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            arg_contains: Some(needle.to_string()),
            reply: Reply::Output(output),
        });
        self
    }

    /// Simulate `program` not being installed.
    pub fn fail_to_spawn(mut self, program: &str) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            arg_contains: None,
            reply: Reply::SpawnError("No such file or directory (os error 2)".to_string()),
        });
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands run so far for `program`.
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn reply_for(&self, spec: &CommandSpec) -> Reply {
        self.rules
            .iter()
            .filter(|r| r.arg_contains.is_some())
            .chain(self.rules.iter().filter(|r| r.arg_contains.is_none()))
            .find(|r| r.matches(spec))
            .map(|r| r.reply.clone())
            .unwrap_or_else(|| Reply::Output(CommandOutput::ok("")))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        match self.reply_for(spec) {
            Reply::Output(out) => Ok(out),
            Reply::SpawnError(reason) => Err(PrDepsError::Command {
                program: spec.program.clone(),
                reason,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryPullRequestSource
// ---------------------------------------------------------------------------

/// Pull requests and comments keyed by API URL.
#[derive(Debug, Default)]
pub struct MemoryPullRequestSource {
    pulls: HashMap<String, PullRequest>,
    comments: HashMap<String, Vec<IssueComment>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryPullRequestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull(mut self, url: &str, pr: PullRequest) -> Self {
        self.pulls.insert(url.to_string(), pr);
        self
    }

    pub fn with_comments(mut self, url: &str, comments: Vec<IssueComment>) -> Self {
        self.comments.insert(url.to_string(), comments);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PullRequestSource for MemoryPullRequestSource {
    async fn pull_request(&self, url: &str) -> Result<PullRequest> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pulls
            .get(url)
            .cloned()
            .ok_or_else(|| PrDepsError::Source(format!("no pull request at {url}")))
    }

    async fn comments(&self, url: &str) -> Result<Vec<IssueComment>> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self.comments.get(url).cloned().unwrap_or_default())
    }
}
