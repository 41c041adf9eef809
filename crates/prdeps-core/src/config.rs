//! Run settings.
//!
//! Every field has an environment fallback so the tool can run unattended
//! from a workflow step; the CLI layers flags on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::components::BuildOrder;
use crate::domain::error::{PrDepsError, Result};

pub const DEFAULT_CLONE_BASE_URL: &str = "https://github.com";
pub const DEFAULT_BUILD_TOOL: &str = "mvn";
pub const DEFAULT_XML_TOOL: &str = "xmlstarlet";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 600;

/// Settings for a single prdeps run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the GitHub event payload.
    pub event_path: Option<PathBuf>,
    /// Components are cloned into `<workdir>/<component>`.
    pub workdir: PathBuf,
    /// Per-component logs go to `<log_dir>/<component>.log`.
    pub log_dir: PathBuf,
    /// Repositories are cloned from `<clone_base_url>/<owner>/<name>.git`.
    pub clone_base_url: String,
    pub build_tool: String,
    pub xml_tool: String,
    /// Per-component build timeout (0 = none).
    pub build_timeout_secs: u64,
    /// Per-repository clone timeout (0 = none).
    pub clone_timeout_secs: u64,
    pub build_order: BuildOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            event_path: std::env::var_os("GITHUB_EVENT_PATH").map(PathBuf::from),
            workdir: std::env::var_os("PRDEPS_WORKDIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_dir: std::env::var_os("PRDEPS_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            clone_base_url: std::env::var("PRDEPS_CLONE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CLONE_BASE_URL.to_string()),
            build_tool: std::env::var("PRDEPS_BUILD_TOOL")
                .unwrap_or_else(|_| DEFAULT_BUILD_TOOL.to_string()),
            xml_tool: std::env::var("PRDEPS_XML_TOOL")
                .unwrap_or_else(|_| DEFAULT_XML_TOOL.to_string()),
            build_timeout_secs: 0,
            clone_timeout_secs: DEFAULT_CLONE_TIMEOUT_SECS,
            build_order: BuildOrder::default(),
        }
    }
}

impl Settings {
    /// Settings from environment variables, including `PRDEPS_BUILD_TIMEOUT`
    /// and a custom build order from `PRDEPS_BUILD_ORDER`.
    ///
    /// A timeout that is not a whole number of seconds, or an invalid order
    /// list, is an error.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = non_empty_var("PRDEPS_BUILD_TIMEOUT") {
            settings.build_timeout_secs = raw.parse::<u64>().map_err(|e| {
                PrDepsError::Config(format!("PRDEPS_BUILD_TIMEOUT={raw:?}: {e}"))
            })?;
        }

        match non_empty_var("PRDEPS_BUILD_ORDER") {
            Some(list) => settings.with_build_order(&list),
            None => Ok(settings),
        }
    }

    /// Settings rooted at `workdir`, with logs under `<workdir>/logs` and no
    /// environment lookups. Used by tests and embedders.
    pub fn in_workdir(workdir: &Path) -> Self {
        Settings {
            event_path: None,
            workdir: workdir.to_path_buf(),
            log_dir: workdir.join(DEFAULT_LOG_DIR),
            clone_base_url: DEFAULT_CLONE_BASE_URL.to_string(),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            xml_tool: DEFAULT_XML_TOOL.to_string(),
            build_timeout_secs: 0,
            clone_timeout_secs: DEFAULT_CLONE_TIMEOUT_SECS,
            build_order: BuildOrder::default(),
        }
    }

    /// Replace the build order with a comma separated list.
    pub fn with_build_order(mut self, list: &str) -> Result<Self> {
        self.build_order = BuildOrder::parse(list)?;
        Ok(self)
    }

    /// Checkout directory for `component`.
    pub fn component_dir(&self, component: &str) -> PathBuf {
        self.workdir.join(component)
    }

    /// Log file for `component`.
    pub fn log_path(&self, component: &str) -> PathBuf {
        self.log_dir.join(format!("{component}.log"))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
