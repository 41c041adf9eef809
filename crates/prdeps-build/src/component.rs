//! Building a single component checkout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use prdeps_core::{
    diff_worktree, CommandRunner, CommandSpec, ComponentLog, PrDepsError, Result, Settings,
};
use serde::{Deserialize, Serialize};

use crate::descriptor::{descriptor_path, read_project_version, update_dependency_version};

/// Versions produced so far in this run, keyed by component (artifact) name.
pub type BuiltVersions = BTreeMap<String, String>;

/// Outcome of a successful component build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBuild {
    pub component: String,
    /// Version read back from the component's descriptor.
    pub version: String,
    pub duration_ms: u64,
    pub log_path: PathBuf,
}

/// The build tool invocation for a component checkout.
pub fn build_command(build_tool: &str, component_dir: &Path) -> CommandSpec {
    CommandSpec::new(build_tool).args([
        "-f".to_string(),
        descriptor_path(component_dir).to_string_lossy().to_string(),
        "install".to_string(),
        "-D".to_string(),
        "skipTests".to_string(),
    ])
}

/// Builds component checkouts with the configured tools.
pub struct ComponentBuilder<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
}

impl<'a> ComponentBuilder<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a Settings) -> Self {
        Self { runner, settings }
    }

    /// Build `component`, first pointing its descriptor at every version in
    /// `built`.
    ///
    /// `built` must only hold components built earlier in this run; nothing
    /// else is substituted.
    pub async fn build(&self, component: &str, built: &BuiltVersions) -> Result<ComponentBuild> {
        let start = Instant::now();
        let dir = self.settings.component_dir(component);
        let pom = descriptor_path(&dir);
        let mut log = ComponentLog::create(&self.settings.log_dir, component)?;

        self.substitute_versions(&mut log, component, &dir, &pom, built)
            .await?;

        let spec = build_command(&self.settings.build_tool, &dir)
            .timeout_secs(self.settings.build_timeout_secs);
        log.info(&format!("Running command {spec}"))?;
        let output = self.runner.run(&spec).await?;
        log.command(&spec, &output)?;
        log.info(&format!(
            "Build finished with return code {}",
            output.exit_code
        ))?;

        if !output.passed() {
            log.error(&format!("Error building {component}"))?;
            return Err(PrDepsError::BuildFailed {
                component: component.to_string(),
                exit_code: output.exit_code,
            });
        }

        log.info(&format!("Getting component version from {}", pom.display()))?;
        let version = read_project_version(&pom)?;
        log.info(&format!("Got version for component {component}: {version}"))?;

        Ok(ComponentBuild {
            component: component.to_string(),
            version,
            duration_ms: start.elapsed().as_millis() as u64,
            log_path: log.path().to_path_buf(),
        })
    }

    async fn substitute_versions(
        &self,
        log: &mut ComponentLog,
        component: &str,
        dir: &Path,
        pom: &Path,
        built: &BuiltVersions,
    ) -> Result<()> {
        for (dependency, version) in built {
            log.info(&format!(
                "Setting {dependency} version in {component} to {version}"
            ))?;
            let (spec, output) = update_dependency_version(
                self.runner,
                &self.settings.xml_tool,
                pom,
                dependency,
                version,
            )
            .await?;
            log.command(&spec, &output)?;
            log.info(&format!(
                "Substitution command ran with result {}",
                output.exit_code
            ))?;
            if !output.passed() {
                tracing::warn!(
                    component = %component,
                    dependency = %dependency,
                    exit_code = output.exit_code,
                    "version substitution failed, building with the descriptor as is"
                );
            }

            log.info(&format!("Running git diff in {} to see changes", dir.display()))?;
            match diff_worktree(self.runner, dir).await {
                Ok(diff) => log.info(&diff)?,
                Err(e) => log.error(&e.to_string())?,
            }
        }
        Ok(())
    }
}
