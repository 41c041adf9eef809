//! Component overrides: which repository/branch to build for a component.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A GitHub repository path (`owner/name`) and the branch to check out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub repo: String,
    pub branch: String,
}

impl RepoRef {
    pub fn new(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
        }
    }
}

/// A single `use <component> <repo> <branch>` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentOverride {
    pub component: String,
    pub repo: String,
    pub branch: String,
}

impl ComponentOverride {
    pub fn new(
        component: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.repo, &self.branch)
    }
}

/// Overrides keyed by component name.
///
/// Inserting a component twice keeps the last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSet {
    entries: BTreeMap<String, RepoRef>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an override, returning the entry it replaced.
    pub fn insert(&mut self, ov: ComponentOverride) -> Option<RepoRef> {
        let repo_ref = ov.repo_ref();
        self.entries.insert(ov.component, repo_ref)
    }

    pub fn get(&self, component: &str) -> Option<&RepoRef> {
        self.entries.get(component)
    }

    pub fn contains(&self, component: &str) -> bool {
        self.entries.contains_key(component)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RepoRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<ComponentOverride> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = ComponentOverride>>(iter: I) -> Self {
        let mut set = OverrideSet::new();
        for ov in iter {
            set.insert(ov);
        }
        set
    }
}
