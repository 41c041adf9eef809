//! Fixed component precedence and build planning.
//!
//! The known components form a single dependency chain: every component may
//! depend on any component listed before it. Ordering a set of overrides is
//! therefore a sort by position in the precedence list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{PrDepsError, Result};
use crate::domain::overrides::{OverrideSet, RepoRef};

/// Every known component, in the order it must be built.
pub const DEFAULT_BUILD_ORDER: [&str; 7] = [
    "jitsi-utils",
    "jitsi-metaconfig",
    "jicoco",
    "rtp",
    "jitsi-media-transform",
    "jitsi-videobridge",
    "jicofo",
];

/// A precedence list of component names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    components: Vec<String>,
}

impl Default for BuildOrder {
    fn default() -> Self {
        Self {
            components: DEFAULT_BUILD_ORDER.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl BuildOrder {
    /// Use a custom precedence list. Empty lists and duplicates are rejected.
    pub fn new(components: Vec<String>) -> Result<Self> {
        if components.is_empty() {
            return Err(PrDepsError::InvalidBuildOrder(
                "build order cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for c in &components {
            if !seen.insert(c.as_str()) {
                return Err(PrDepsError::InvalidBuildOrder(format!(
                    "component '{c}' listed more than once"
                )));
            }
        }
        Ok(Self { components })
    }

    /// Parse a comma separated list, e.g. `"a, b,c"`.
    pub fn parse(list: &str) -> Result<Self> {
        let components = list
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(components)
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Position of `component` in the precedence list.
    pub fn position(&self, component: &str) -> Option<usize> {
        self.components.iter().position(|c| c == component)
    }

    /// Order the overridden components for building.
    ///
    /// Fails with [`PrDepsError::UnknownComponent`] naming every component
    /// absent from the precedence list.
    pub fn resolve(&self, overrides: &OverrideSet) -> Result<BuildPlan> {
        let mut ranked = Vec::with_capacity(overrides.len());
        let mut unknown = Vec::new();

        for (component, repo) in overrides.iter() {
            match self.position(component) {
                Some(rank) => ranked.push((rank, component.to_string(), repo.clone())),
                None => unknown.push(component.to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(PrDepsError::UnknownComponent { names: unknown });
        }

        ranked.sort_by_key(|(rank, _, _)| *rank);
        let steps = ranked
            .into_iter()
            .enumerate()
            .map(|(position, (_, component, repo))| BuildStep {
                position,
                component,
                repo,
            })
            .collect::<Vec<_>>();

        debug!(
            order = ?steps.iter().map(|s| s.component.as_str()).collect::<Vec<_>>(),
            "resolved build order"
        );
        Ok(BuildPlan { steps })
    }
}

/// One component to check out and build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    /// 0-indexed position in the plan.
    pub position: usize,
    pub component: String,
    pub repo: RepoRef,
}

/// Components in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub steps: Vec<BuildStep>,
}

impl BuildPlan {
    pub fn component_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.component.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}
