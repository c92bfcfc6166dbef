//! Finding the virtual environment pipenv created
//!
//! pipenv names its environment after the project directory plus a hash,
//! so the only reliable way to find it is to look for the one directory
//! under `WORKON_HOME` that carries a `pyvenv.cfg`.

use crate::errors::BuildError;
use pipenv_config::venv_paths::has_venv_marker;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait VenvDirLocator {
    fn locate_venv_dir(&self, target: &Path) -> Result<PathBuf, BuildError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VenvLocator;

impl VenvLocator {
    pub fn new() -> Self {
        VenvLocator
    }
}

impl VenvDirLocator for VenvLocator {
    /// First immediate subdirectory of `target`, in name order, containing
    /// a venv marker file
    fn locate_venv_dir(&self, target: &Path) -> Result<PathBuf, BuildError> {
        let read_failed = |source| BuildError::ReadTarget {
            path: target.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(target)
            .map_err(read_failed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_failed)?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let is_dir = entry
                .file_type()
                .map_err(|source| BuildError::VenvLookup {
                    path: target.to_path_buf(),
                    source,
                })?
                .is_dir();
            if !is_dir {
                continue;
            }

            let candidate = entry.path();
            let found = has_venv_marker(&candidate).map_err(|source| BuildError::VenvLookup {
                path: target.to_path_buf(),
                source,
            })?;
            if found {
                debug!("Found virtual environment {}", candidate.display());
                return Ok(candidate);
            }
        }

        Err(BuildError::VenvNotFound {
            path: target.to_path_buf(),
        })
    }
}
