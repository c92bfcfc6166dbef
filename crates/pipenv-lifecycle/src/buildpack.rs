//! `buildpack.toml` descriptor

use crate::errors::LifecycleError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const BUILDPACK_TOML: &str = "buildpack.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildpackInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    /// SBOM media types this buildpack emits
    #[serde(default, rename = "sbom-formats")]
    pub sbom_formats: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BuildpackDescriptor {
    buildpack: BuildpackInfo,
}

impl BuildpackInfo {
    /// Read the `[buildpack]` table of `<cnb_path>/buildpack.toml`
    pub fn load(cnb_path: &Path) -> Result<Self, LifecycleError> {
        let path = cnb_path.join(BUILDPACK_TOML);
        let content =
            fs::read_to_string(&path).map_err(LifecycleError::io("failed to read buildpack descriptor", &path))?;
        let descriptor: BuildpackDescriptor =
            toml::from_str(&content).map_err(|source| LifecycleError::Parse { path, source })?;
        Ok(descriptor.buildpack)
    }
}
