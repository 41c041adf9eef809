//! External command execution.
//!
//! Every tool prdeps drives (`git`, `xmlstarlet`, `mvn`) goes through a
//! [`CommandRunner`], so the pipeline can be exercised with
//! [`crate::fakes::ScriptedRunner`] instead of real processes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::error::{PrDepsError, Result};

/// A command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherits the current one when `None`.
    pub cwd: Option<PathBuf>,
    /// Timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout_secs: 0,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of running a command to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (-1 when killed by a signal).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub success: bool,
}

impl CommandOutput {
    /// A successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            success: true,
            ..Default::default()
        }
    }

    /// A failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
            success: false,
            ..Default::default()
        }
    }

    /// Whether the command exited with status 0.
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Runs external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion. A non-zero exit is not an error here; only
    /// failing to spawn or timing out is.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let start = Instant::now();
        debug!(command = %spec, cwd = ?spec.cwd, "spawning");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| PrDepsError::Command {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;

        let output = if spec.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(spec.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| PrDepsError::Command {
                program: spec.program.clone(),
                reason: format!("timed out after {} seconds", spec.timeout_secs),
            })??
        } else {
            child.wait_with_output().await?
        };

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            success: output.status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_passed() {
        assert!(CommandOutput::ok("").passed());
        assert!(!CommandOutput::failed(1, "boom").passed());
    }

    #[test]
    fn test_spec_display_joins_args() {
        let spec = CommandSpec::new("mvn")
            .args(["-f", "rtp/pom.xml", "install"])
            .arg("-D")
            .arg("skipTests");
        assert_eq!(spec.to_string(), "mvn -f rtp/pom.xml install -D skipTests");
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let spec = CommandSpec::new("echo").arg("hello").timeout_secs(60);
        let out = SystemRunner.run(&spec).await.expect("execute failed");
        assert!(out.passed());
        assert!(out.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let out = SystemRunner
            .run(&CommandSpec::new("false"))
            .await
            .expect("execute failed");
        assert!(!out.passed());
        assert_ne!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn test_execute_respects_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let out = SystemRunner
            .run(&CommandSpec::new("ls").current_dir(dir.path()))
            .await
            .unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_missing_program_is_command_error() {
        let err = SystemRunner
            .run(&CommandSpec::new("prdeps-no-such-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrDepsError::Command { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_command_error() {
        let err = SystemRunner
            .run(&CommandSpec::new("sleep").arg("5").timeout_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
