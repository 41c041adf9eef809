//! Git checkout of component overrides.

use std::path::{Path, PathBuf};

use tracing::{info, Instrument};

use crate::components::BuildPlan;
use crate::config::Settings;
use crate::domain::error::{PrDepsError, Result};
use crate::domain::overrides::RepoRef;
use crate::process::{CommandRunner, CommandSpec};
use crate::telemetry::component_span;

/// Clone URL for `owner/name` under `base_url`.
pub fn clone_url(base_url: &str, repo: &str) -> String {
    format!("{}/{}.git", base_url.trim_end_matches('/'), repo)
}

/// The `git clone` invocation for one override.
pub fn clone_command(base_url: &str, repo_ref: &RepoRef, dest: &Path) -> CommandSpec {
    CommandSpec::new("git").args([
        "clone".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        "--branch".to_string(),
        repo_ref.branch.clone(),
        clone_url(base_url, &repo_ref.repo),
        dest.to_string_lossy().to_string(),
    ])
}

/// Shallow-clone `repo_ref` into `<workdir>/<component>`.
///
/// Fails if the destination already exists and is not empty, or if git
/// exits non-zero.
pub async fn clone_shallow(
    runner: &dyn CommandRunner,
    settings: &Settings,
    component: &str,
    repo_ref: &RepoRef,
) -> Result<PathBuf> {
    let dest = settings.component_dir(component);
    if dest.exists() && dest.read_dir()?.next().is_some() {
        return Err(PrDepsError::GitError(format!(
            "checkout directory {} already exists and is not empty",
            dest.display()
        )));
    }

    info!(
        "Checking out branch '{}' from repo '{}' for component '{}'",
        repo_ref.branch, repo_ref.repo, component
    );
    let spec = clone_command(&settings.clone_base_url, repo_ref, &dest)
        .timeout_secs(settings.clone_timeout_secs);
    let output = runner.run(&spec).await?;

    if !output.passed() {
        return Err(PrDepsError::GitError(format!(
            "git clone of {} ({}) failed: {}",
            repo_ref.repo,
            repo_ref.branch,
            output.stderr.trim()
        )));
    }

    Ok(dest)
}

/// Clone every step of `plan`, in plan order.
pub async fn checkout_all(
    runner: &dyn CommandRunner,
    settings: &Settings,
    plan: &BuildPlan,
) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::with_capacity(plan.len());
    for step in &plan.steps {
        let dir = clone_shallow(runner, settings, &step.component, &step.repo)
            .instrument(component_span(&step.component))
            .await?;
        dirs.push(dir);
    }
    Ok(dirs)
}

/// `git diff -w` in `dir`, for logging what a descriptor edit changed.
pub async fn diff_worktree(runner: &dyn CommandRunner, dir: &Path) -> Result<String> {
    let spec = CommandSpec::new("git").args(["diff", "-w"]).current_dir(dir);
    let output = runner.run(&spec).await?;
    if !output.passed() {
        return Err(PrDepsError::GitError(format!(
            "git diff in {} failed: {}",
            dir.display(),
            output.stderr.trim()
        )));
    }
    Ok(output.stdout)
}
