//! `Pipfile.lock` (JSON) parsing

use crate::errors::ManifestError;
use crate::VersionParser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const PIPFILE_LOCK: &str = "Pipfile.lock";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipfileLock {
    #[serde(default, rename = "_meta")]
    pub meta: LockMeta,
    #[serde(default)]
    pub default: BTreeMap<String, LockedPackage>,
    #[serde(default)]
    pub develop: BTreeMap<String, LockedPackage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockMeta {
    #[serde(default)]
    pub requires: LockRequires,
    #[serde(default)]
    pub sources: Vec<LockSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockRequires {
    #[serde(default)]
    pub python_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One entry of the `default` or `develop` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockedPackage {
    /// Pinned specifier such as `==2.0.1`; absent for VCS/path installs
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub markers: Option<String>,
}

impl LockedPackage {
    /// The version with the `==` pin stripped
    pub fn pinned_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(|v| v.trim().trim_start_matches("==").trim())
            .filter(|v| !v.is_empty())
    }
}

impl PipfileLock {
    /// Load `<dir>/Pipfile.lock`
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(PIPFILE_LOCK);
        let content = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ManifestError::Json { path, source })
    }
}

/// Reads `_meta.requires.python_version` from `<dir>/Pipfile.lock`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipfileLockParser;

impl PipfileLockParser {
    pub fn new() -> Self {
        PipfileLockParser
    }
}

impl VersionParser for PipfileLockParser {
    fn parse_version(&self, dir: &Path) -> Result<Option<String>, ManifestError> {
        let lock = PipfileLock::load(dir)?;
        let version = lock
            .meta
            .requires
            .python_version
            .filter(|v| !v.trim().is_empty());
        debug!("Pipfile.lock python_version: {:?}", version);
        Ok(version)
    }
}
