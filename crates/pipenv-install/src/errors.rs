//! Error types for detect and build

use crate::executable::ExecutionError;
use pipenv_lifecycle::{LifecycleError, SbomError};
use pipenv_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort detection (as opposed to a detect fail)
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("failed to stat Pipfile: {0}")]
    PipfileStat(#[source] io::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Errors that abort the build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("failed to stat Pipfile.lock: {0}")]
    LockFileStat(#[source] io::Error),

    /// A subprocess exited unsuccessfully; `output` is what it printed
    #[error("{command} failed:\n{output}\nerror: {source}")]
    Command {
        command: String,
        output: String,
        #[source]
        source: ExecutionError,
    },

    #[error("reading target directory {} failed:\nerror: {source}", path.display())]
    ReadTarget {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("pipenv virtual env dir lookup failed in target {}: {source}", path.display())]
    VenvLookup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("pipenv virtual env directory not found in target {}", path.display())]
    VenvNotFound { path: PathBuf },

    #[error("failed to locate site packages:\n{stderr}\nerror: {source}")]
    SitePackages {
        stderr: String,
        #[source]
        source: ExecutionError,
    },

    #[error("failed to locate site packages: output is empty")]
    SitePackagesEmpty,

    #[error("failed to generate SBOM for {}: {source}", dir.display())]
    SbomGeneration {
        dir: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error(transparent)]
    Sbom(#[from] SbomError),

    #[error("failed to inspect cache layer {}: {source}", path.display())]
    CacheLayer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
