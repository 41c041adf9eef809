//! prdeps build - ordered Maven builds of overridden components
//!
//! Builds checked-out components one after another:
//! - rewrites each descriptor to use versions built earlier in the run
//! - runs the build tool with tests skipped
//! - reads back the produced version for the components that follow

pub mod component;
pub mod descriptor;
pub mod pipeline;

// Re-export key types
pub use component::{build_command, BuiltVersions, ComponentBuild, ComponentBuilder};
pub use descriptor::{read_project_version, update_dependency_version};
pub use pipeline::{BuildPipeline, PipelineResult};
