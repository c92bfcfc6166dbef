//! Pipenv manifest parsing
//!
//! Two file formats carry the Python version an application wants:
//! the human-edited `Pipfile` (TOML) and the machine-generated
//! `Pipfile.lock` (JSON). Both parsers sit behind [`VersionParser`] so
//! detection can swap either for a test double.

pub mod errors;
pub mod pipfile;
pub mod pipfile_lock;

use std::path::Path;

pub use errors::ManifestError;
pub use pipfile::{Pipfile, PipfileParser, PIPFILE};
pub use pipfile_lock::{LockedPackage, PipfileLock, PipfileLockParser, PIPFILE_LOCK};

/// Extracts the requested Python version from a manifest in `dir`.
///
/// `Ok(None)` means the file parsed but carries no constraint. A missing
/// file is reported as an error for which [`ManifestError::is_not_found`]
/// holds.
pub trait VersionParser {
    fn parse_version(&self, dir: &Path) -> Result<Option<String>, ManifestError>;
}
