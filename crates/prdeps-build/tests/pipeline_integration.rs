//! Integration tests for the build pipeline with a ScriptedRunner.

use std::path::Path;

use prdeps_build::BuildPipeline;
use prdeps_core::fakes::ScriptedRunner;
use prdeps_core::{BuildOrder, CommandOutput, ComponentOverride, OverrideSet, PrDepsError, Settings};

fn checkout(root: &Path, component: &str, version: &str) {
    let dir = root.join(component);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("pom.xml"),
        format!(
            r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <artifactId>{component}</artifactId>
  <version>{version}</version>
</project>
"#
        ),
    )
    .unwrap();
}

fn plan(components: &[&str]) -> prdeps_core::BuildPlan {
    let overrides: OverrideSet = components
        .iter()
        .map(|c| ComponentOverride::new(*c, format!("alice/{c}"), "topic"))
        .collect();
    BuildOrder::default().resolve(&overrides).unwrap()
}

/// Test: every component builds, each seeing only earlier versions.
#[tokio::test]
async fn test_versions_flow_to_later_components() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::in_workdir(dir.path());
    checkout(dir.path(), "jitsi-utils", "1.0-50-gaaa");
    checkout(dir.path(), "rtp", "1.0-20-gbbb");
    checkout(dir.path(), "jicofo", "1.1-900-gccc");
    let runner = ScriptedRunner::new();

    let result = BuildPipeline::new(&runner, &settings)
        .run(&plan(&["jicofo", "rtp", "jitsi-utils"]))
        .await
        .expect("pipeline failed");

    let built: Vec<&str> = result.builds.iter().map(|b| b.component.as_str()).collect();
    assert_eq!(built, vec!["jitsi-utils", "rtp", "jicofo"]);
    assert_eq!(result.versions()["rtp"], "1.0-20-gbbb");

    let edits = runner.calls_to("xmlstarlet");
    // rtp gets jitsi-utils; jicofo gets jitsi-utils and rtp.
    assert_eq!(edits.len(), 3);
    assert!(edits[0].args.last().unwrap().ends_with("rtp/pom.xml"));
    assert!(edits[0].args.contains(&"1.0-50-gaaa".to_string()));
    assert!(edits[1].args.last().unwrap().ends_with("jicofo/pom.xml"));
    assert!(edits[2].args.contains(&"1.0-20-gbbb".to_string()));

    // Components that were not overridden are never substituted.
    assert!(!edits
        .iter()
        .any(|e| e.args.iter().any(|a| a.contains("'jicoco'"))));

    for component in ["jitsi-utils", "rtp", "jicofo"] {
        assert!(dir.path().join(format!("logs/{component}.log")).exists());
    }
}

/// Test: a failing build stops the run before later components.
#[tokio::test]
async fn test_failed_build_aborts_remaining_components() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::in_workdir(dir.path());
    checkout(dir.path(), "jicoco", "1.1");
    checkout(dir.path(), "rtp", "1.0");
    checkout(dir.path(), "jitsi-videobridge", "2.1");
    let runner = ScriptedRunner::new().respond_when(
        "mvn",
        "rtp/pom.xml",
        CommandOutput::failed(1, "[ERROR] COMPILATION ERROR"),
    );

    let err = BuildPipeline::new(&runner, &settings)
        .run(&plan(&["jitsi-videobridge", "rtp", "jicoco"]))
        .await
        .unwrap_err();

    match err {
        PrDepsError::BuildFailed {
            component,
            exit_code,
        } => {
            assert_eq!(component, "rtp");
            assert_eq!(exit_code, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let builds = runner.calls_to("mvn");
    assert_eq!(builds.len(), 2, "jitsi-videobridge must not be attempted");
    assert!(!dir.path().join("logs/jitsi-videobridge.log").exists());
}

/// Test: an empty plan succeeds without running anything.
#[tokio::test]
async fn test_empty_plan() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::in_workdir(dir.path());
    let runner = ScriptedRunner::new();

    let result = BuildPipeline::new(&runner, &settings)
        .run(&prdeps_core::BuildPlan::default())
        .await
        .unwrap();

    assert!(result.builds.is_empty());
    assert!(runner.calls().is_empty());
    assert!(dir.path().join("logs").is_dir());
}
