//! prdeps - build the component overrides a pull request asks for
//!
//! ## Commands
//!
//! - `run`: check out and build every override in dependency order
//! - `plan`: show what `run` would check out, without touching anything
//! - `parse`: parse a `deps:` block from a file or stdin

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use prdeps_build::{BuildPipeline, PipelineResult};
use prdeps_core::{
    checkout_all, extract_deps_block, parse_deps, BuildPlan, Discovery, GithubEvent, OverrideSet,
    Settings, SystemRunner, Trigger,
};
use prdeps_github::{GithubClient, GithubConfig};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "prdeps")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build the cross-repo dependencies requested by a pull request", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check out and build every component the pull request asks for
    Run {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Show the checkout and build order without cloning or building
    Plan {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Parse a deps: block and show the resulting build order
    Parse {
        /// File holding the text to parse (default: stdin)
        file: Option<PathBuf>,

        /// Comma separated build order replacing the default
        #[arg(long)]
        build_order: Option<String>,
    },
}

/// Which pull request to work on.
#[derive(Args, Debug, Default)]
struct TargetArgs {
    /// GitHub event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Repository of a pull request to build instead of the event's (owner/name)
    #[arg(long, requires = "pr")]
    repo: Option<String>,

    /// Pull request number, used with --repo
    #[arg(long, requires = "repo")]
    pr: Option<u64>,

    /// GitHub API base URL (default: $GITHUB_API_URL or api.github.com)
    #[arg(long)]
    api_url: Option<String>,
}

/// Overrides for [`Settings`] read from the environment.
#[derive(Args, Debug, Default)]
struct BuildArgs {
    /// Directory components are cloned into
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Directory for per-component log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Base URL repositories are cloned from
    #[arg(long)]
    clone_base_url: Option<String>,

    /// Build tool binary
    #[arg(long)]
    build_tool: Option<String>,

    /// xmlstarlet binary used to edit descriptors
    #[arg(long)]
    xml_tool: Option<String>,

    /// Per-component build timeout in seconds (0 = none)
    #[arg(long)]
    build_timeout: Option<u64>,

    /// Comma separated build order replacing the default
    #[arg(long)]
    build_order: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    prdeps_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run { target, build } => cmd_run(&target, &build).await,
        Commands::Plan { target, build } => cmd_plan(&target, &build, cli.json).await,
        Commands::Parse { file, build_order } => {
            cmd_parse(file.as_deref(), build_order.as_deref(), cli.json)
        }
    }
}

/// Environment settings with command-line overrides applied.
fn settings_from(target: &TargetArgs, build: &BuildArgs) -> Result<Settings> {
    let mut settings = Settings::from_env().context("Invalid prdeps environment settings")?;

    if let Some(path) = &target.event_path {
        settings.event_path = Some(path.clone());
    }
    if let Some(dir) = &build.workdir {
        settings.workdir = dir.clone();
    }
    if let Some(dir) = &build.log_dir {
        settings.log_dir = dir.clone();
    }
    if let Some(url) = &build.clone_base_url {
        settings.clone_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(tool) = &build.build_tool {
        settings.build_tool = tool.clone();
    }
    if let Some(tool) = &build.xml_tool {
        settings.xml_tool = tool.clone();
    }
    if let Some(secs) = build.build_timeout {
        settings.build_timeout_secs = secs;
    }
    if let Some(order) = &build.build_order {
        settings = settings
            .with_build_order(order)
            .context("Invalid --build-order")?;
    }

    debug!(settings = %serde_json::to_string(&settings)?, "Resolved settings");
    Ok(settings)
}

/// Work out which PR to build and find its overrides.
async fn discover(target: &TargetArgs, settings: &Settings) -> Result<Discovery> {
    let mut config = GithubConfig::from_env();
    if let Some(url) = &target.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    let client = GithubClient::new(config).context("Failed to create GitHub client")?;

    let trigger = match (&target.repo, target.pr) {
        (Some(repo), Some(number)) => Trigger::PullRequest {
            action: "manual".to_string(),
            pr_url: client.pull_request_url(repo, number),
        },
        _ => {
            let path = settings
                .event_path
                .as_deref()
                .context("No event payload: set GITHUB_EVENT_PATH or pass --event-path")?;
            GithubEvent::load(path)?.trigger()
        }
    };

    if let Trigger::Unsupported { action } = &trigger {
        bail!("Unhandled event action type: {action:?}");
    }

    let discovery = prdeps_core::discover_overrides(&trigger, &client)
        .await
        .context("Failed to collect overrides from the pull request")?;
    info!(origin = ?discovery.origin, "Collected overrides");
    Ok(discovery)
}

/// Check out and build everything the PR asks for
async fn cmd_run(target: &TargetArgs, build: &BuildArgs) -> Result<()> {
    let settings = settings_from(target, build)?;
    let discovery = discover(target, &settings).await?;
    let plan = settings.build_order.resolve(&discovery.overrides)?;

    println!("Building PR #{}", discovery.pull_request.number);
    print_plan(&plan);
    println!();

    let runner = SystemRunner;
    checkout_all(&runner, &settings, &plan)
        .await
        .context("Checkout failed")?;

    let result = BuildPipeline::new(&runner, &settings)
        .run(&plan)
        .await
        .context("Build failed")?;

    print_result(&result);
    Ok(())
}

/// Show the plan for the PR without building it
async fn cmd_plan(target: &TargetArgs, build: &BuildArgs, json: bool) -> Result<()> {
    let settings = settings_from(target, build)?;
    let discovery = discover(target, &settings).await?;
    let plan = settings.build_order.resolve(&discovery.overrides)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("PR #{} ({:?})", discovery.pull_request.number, discovery.origin);
        print_plan(&plan);
    }
    Ok(())
}

/// Parse a deps: block from `file` or stdin
fn cmd_parse(file: Option<&Path>, build_order: Option<&str>, json: bool) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let mut settings = Settings::from_env().context("Invalid prdeps environment settings")?;
    if let Some(order) = build_order {
        settings = settings
            .with_build_order(order)
            .context("Invalid --build-order")?;
    }

    let plan = settings.build_order.resolve(&overrides_from_text(&text))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

/// Overrides in `text`. Text without a `deps:` marker is parsed whole.
fn overrides_from_text(text: &str) -> OverrideSet {
    parse_deps(extract_deps_block(text).unwrap_or(text))
}

fn print_plan(plan: &BuildPlan) {
    if plan.is_empty() {
        println!("No components to build");
        return;
    }
    println!("Build order:");
    for step in &plan.steps {
        println!(
            "  {}. {} <- {}@{}",
            step.position + 1,
            step.component,
            step.repo.repo,
            step.repo.branch
        );
    }
}

fn print_result(result: &PipelineResult) {
    println!("Run ID: {}", result.run_id);
    println!("Started: {}", result.started_at.to_rfc3339());
    println!("Duration: {}ms", result.duration_ms);
    println!();
    for build in &result.builds {
        println!(
            "  ✓ {} {} ({}ms, log: {})",
            build.component,
            build.version,
            build.duration_ms,
            build.log_path.display()
        );
    }
    println!();
    println!("Summary: {} components built", result.builds.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_accepts_manual_target() {
        let cli = Cli::try_parse_from([
            "prdeps",
            "run",
            "--repo",
            "jitsi/jicofo",
            "--pr",
            "42",
            "--build-order",
            "jicoco,jicofo",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { target, build } => {
                assert_eq!(target.repo.as_deref(), Some("jitsi/jicofo"));
                assert_eq!(target.pr, Some(42));
                assert_eq!(build.build_order.as_deref(), Some("jicoco,jicofo"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_repo_requires_pr() {
        assert!(Cli::try_parse_from(["prdeps", "plan", "--repo", "jitsi/jicofo"]).is_err());
        assert!(Cli::try_parse_from(["prdeps", "plan", "--pr", "3"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["prdeps", "parse", "deps.txt", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_settings_from_applies_overrides() {
        let target = TargetArgs {
            event_path: Some(PathBuf::from("/tmp/event.json")),
            ..Default::default()
        };
        let build = BuildArgs {
            workdir: Some(PathBuf::from("/tmp/work")),
            log_dir: Some(PathBuf::from("/tmp/logs")),
            clone_base_url: Some("https://git.example.com/".to_string()),
            build_tool: Some("mvnw".to_string()),
            xml_tool: Some("xml".to_string()),
            build_timeout: Some(900),
            build_order: Some("rtp,jicofo".to_string()),
        };

        let settings = settings_from(&target, &build).unwrap();
        assert_eq!(settings.event_path, Some(PathBuf::from("/tmp/event.json")));
        assert_eq!(settings.workdir, PathBuf::from("/tmp/work"));
        assert_eq!(settings.log_path("rtp"), PathBuf::from("/tmp/logs/rtp.log"));
        assert_eq!(settings.clone_base_url, "https://git.example.com");
        assert_eq!(settings.build_tool, "mvnw");
        assert_eq!(settings.xml_tool, "xml");
        assert_eq!(settings.build_timeout_secs, 900);
        assert_eq!(settings.build_order.components(), ["rtp", "jicofo"]);
    }

    #[test]
    fn test_settings_from_rejects_duplicate_order() {
        let build = BuildArgs {
            build_order: Some("rtp,rtp".to_string()),
            ..Default::default()
        };
        assert!(settings_from(&TargetArgs::default(), &build).is_err());
    }

    #[test]
    fn test_overrides_from_text() {
        let marked = "Fixes a leak\ndeps:\nuse rtp alice/jitsi-rtp fix-leak\n";
        let overrides = overrides_from_text(marked);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get("rtp").unwrap().repo, "alice/jitsi-rtp");

        let bare = "use jicoco bob/jicoco main\nnot a directive\n";
        let overrides = overrides_from_text(bare);
        assert_eq!(overrides.components().collect::<Vec<_>>(), ["jicoco"]);
    }

    #[test]
    fn test_cmd_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.md");
        std::fs::write(
            &path,
            "deps:\nuse jicofo a/jicofo b\nuse jitsi-utils a/jitsi-utils b\n",
        )
        .unwrap();
        assert!(cmd_parse(Some(&path), None, false).is_ok());
    }

    #[test]
    fn test_cmd_parse_unknown_component_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.md");
        std::fs::write(&path, "deps:\nuse not-a-component a/b c\n").unwrap();
        assert!(cmd_parse(Some(&path), None, false).is_err());
    }

    #[test]
    fn test_cmd_parse_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_parse(Some(&dir.path().join("absent")), None, true).is_err());
    }
}
