use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a Pipfile or Pipfile.lock
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// True when the file simply wasn't there. Detection treats this as
    /// "no version constraint" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManifestError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
