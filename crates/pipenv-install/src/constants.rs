//! Names shared with the rest of the Python buildpack family

/// Dependency provided by this buildpack
pub const SITE_PACKAGES: &str = "site-packages";

/// Python runtime, provided by the CPython buildpack
pub const CPYTHON: &str = "cpython";

/// Installer, provided by the Pipenv buildpack
pub const PIPENV: &str = "pipenv";

/// Layer holding the virtual environment with the installed dependencies
pub const PACKAGES_LAYER_NAME: &str = "packages";

/// Layer holding the pipenv download cache
pub const CACHE_LAYER_NAME: &str = "cache";

/// Delimiter for `PATH`, the lifecycle only runs on Linux images
pub const PATH_DELIMITER: &str = ":";

/// Separator for search-path lists such as `PYTHONPATH`
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: &str = ":";
