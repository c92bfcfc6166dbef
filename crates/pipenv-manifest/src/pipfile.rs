//! `Pipfile` (TOML) parsing

use crate::errors::ManifestError;
use crate::VersionParser;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const PIPFILE: &str = "Pipfile";

/// The parts of a Pipfile this buildpack reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pipfile {
    #[serde(default)]
    pub requires: Requires,
    #[serde(default)]
    pub packages: toml::Table,
    #[serde(default, rename = "dev-packages")]
    pub dev_packages: toml::Table,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Requires {
    #[serde(default)]
    pub python_version: Option<String>,
    #[serde(default)]
    pub python_full_version: Option<String>,
}

impl Pipfile {
    /// Load `<dir>/Pipfile`
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(PIPFILE);
        let content = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ManifestError::Toml { path, source })
    }
}

/// Reads `[requires] python_version` from `<dir>/Pipfile`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipfileParser;

impl PipfileParser {
    pub fn new() -> Self {
        PipfileParser
    }
}

impl VersionParser for PipfileParser {
    fn parse_version(&self, dir: &Path) -> Result<Option<String>, ManifestError> {
        let pipfile = Pipfile::load(dir)?;
        let version = pipfile
            .requires
            .python_version
            .filter(|v| !v.trim().is_empty());
        debug!("Pipfile python_version: {:?}", version);
        Ok(version)
    }
}
