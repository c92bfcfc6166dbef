use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::sbom::SbomError;

/// Errors raised while reading lifecycle inputs or writing layer output
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: toml::ser::Error,
    },

    #[error(transparent)]
    Sbom(#[from] SbomError),
}

impl LifecycleError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| LifecycleError::Io {
            action,
            path,
            source,
        }
    }
}
