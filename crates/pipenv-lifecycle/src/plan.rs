//! Build plan (detect output) and buildpack plan (build input)

use crate::errors::LifecycleError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// What a buildpack offers and needs, written by detect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "M: Deserialize<'de>"))]
pub struct BuildPlan<M = toml::Table> {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<BuildPlanProvision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<BuildPlanRequirement<M>>,
}

impl<M> Default for BuildPlan<M> {
    fn default() -> Self {
        BuildPlan {
            provides: Vec::new(),
            requires: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlanProvision {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlanRequirement<M = toml::Table> {
    pub name: String,
    pub metadata: M,
}

/// Write the detect plan to the path the lifecycle handed us
pub fn write_build_plan<M: Serialize>(plan: &BuildPlan<M>, path: &Path) -> Result<(), LifecycleError> {
    let content = toml::to_string_pretty(plan).map_err(|source| LifecycleError::Serialize {
        what: "build plan".to_string(),
        source,
    })?;
    fs::write(path, content).map_err(LifecycleError::io("failed to write build plan", path))?;
    debug!("Build plan written to {}", path.display());
    Ok(())
}

/// The entries this buildpack was asked to provide, read by build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlan {
    #[serde(default)]
    pub entries: Vec<BuildpackPlanEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlanEntry {
    pub name: String,
    #[serde(default)]
    pub metadata: toml::Table,
}

impl BuildpackPlanEntry {
    pub fn new(name: impl Into<String>) -> Self {
        BuildpackPlanEntry {
            name: name.into(),
            metadata: toml::Table::new(),
        }
    }

    pub fn with_flag(mut self, key: &str, value: bool) -> Self {
        self.metadata.insert(key.to_string(), toml::Value::Boolean(value));
        self
    }

    /// Boolean metadata flag; anything that isn't `true` counts as false
    pub fn flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(false)
    }
}

impl BuildpackPlan {
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let content =
            fs::read_to_string(path).map_err(LifecycleError::io("failed to read buildpack plan", path))?;
        toml::from_str(&content).map_err(|source| LifecycleError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
