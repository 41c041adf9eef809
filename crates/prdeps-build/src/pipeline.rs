//! Sequential build of every component in a plan.

use std::time::Instant;

use chrono::{DateTime, Utc};
use prdeps_core::telemetry::component_span;
use prdeps_core::{BuildPlan, CommandRunner, Result, Settings};
use serde::{Deserialize, Serialize};
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::component::{BuiltVersions, ComponentBuild, ComponentBuilder};

/// Result of a complete pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    /// Builds in plan order.
    pub builds: Vec<ComponentBuild>,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Versions produced by this run, keyed by component.
    pub fn versions(&self) -> BuiltVersions {
        self.builds
            .iter()
            .map(|b| (b.component.clone(), b.version.clone()))
            .collect()
    }
}

/// Builds a [`BuildPlan`] one component at a time.
pub struct BuildPipeline<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a Settings) -> Self {
        Self { runner, settings }
    }

    /// Build every step of `plan` in order.
    ///
    /// Each component sees the versions of the components built before it.
    /// The first failure is returned and no later component is attempted.
    pub async fn run(&self, plan: &BuildPlan) -> Result<PipelineResult> {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();
        std::fs::create_dir_all(&self.settings.log_dir)?;

        info!(run_id = %run_id, components = ?plan.component_names(), "Starting build pipeline");

        let builder = ComponentBuilder::new(self.runner, self.settings);
        let mut built = BuiltVersions::new();
        let mut builds = Vec::with_capacity(plan.len());

        for step in &plan.steps {
            info!("Building {}", step.component);
            let result = builder
                .build(&step.component, &built)
                .instrument(component_span(&step.component))
                .await;

            match result {
                Ok(build) => {
                    info!(
                        component = %build.component,
                        version = %build.version,
                        duration_ms = build.duration_ms,
                        "Component built"
                    );
                    built.insert(build.component.clone(), build.version.clone());
                    builds.push(build);
                }
                Err(e) => {
                    error!(run_id = %run_id, component = %step.component, error = %e, "Build pipeline aborted");
                    return Err(e);
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(run_id = %run_id, duration_ms, "Build pipeline completed successfully");

        Ok(PipelineResult {
            run_id,
            started_at,
            builds,
            duration_ms,
        })
    }
}
