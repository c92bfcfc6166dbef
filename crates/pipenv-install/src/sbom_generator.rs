//! Software bill of materials for the installed dependencies

use crate::errors::BuildError;
use pipenv_lifecycle::{Sbom, SbomPackage};
use pipenv_manifest::{PipfileLock, PIPFILE_LOCK};
use std::path::Path;
use tracing::debug;

pub trait SbomGenerator {
    fn generate(&self, dir: &Path) -> Result<Sbom, BuildError>;
}

/// Builds the SBOM from the pins in `Pipfile.lock`. Without a lock file
/// nothing is pinned and the SBOM is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipfileLockSbomGenerator;

impl PipfileLockSbomGenerator {
    pub fn new() -> Self {
        PipfileLockSbomGenerator
    }
}

impl SbomGenerator for PipfileLockSbomGenerator {
    fn generate(&self, dir: &Path) -> Result<Sbom, BuildError> {
        let lock = match PipfileLock::load(dir) {
            Ok(lock) => lock,
            Err(e) if e.is_not_found() => {
                debug!("No {} in {}, empty SBOM", PIPFILE_LOCK, dir.display());
                return Ok(Sbom::default());
            }
            Err(source) => {
                return Err(BuildError::SbomGeneration {
                    dir: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut packages: Vec<SbomPackage> = Vec::new();
        for (name, locked) in lock.default.iter().chain(lock.develop.iter()) {
            let mut package = SbomPackage::new(name.clone(), locked.pinned_version().map(str::to_string));
            let normalized = package.normalized_name();
            if packages.iter().any(|p| p.normalized_name() == normalized) {
                continue;
            }
            package.location = Some(PIPFILE_LOCK.to_string());
            packages.push(package);
        }
        debug!("SBOM lists {} packages", packages.len());

        Ok(Sbom::new(packages))
    }
}
