//! Path conventions inside a pipenv-created virtual environment
//!
//! pipenv names its environments `<project>-<hash>` under `WORKON_HOME`, and
//! that naming has changed between pipenv releases. The only stable way to
//! recognise one is the `pyvenv.cfg` file every venv carries at its root.

use std::io;
use std::path::{Path, PathBuf};

/// The name of the binaries/scripts directory in a Python venv
/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

/// File present at the root of every virtual environment
pub const VENV_MARKER_FILE: &str = "pyvenv.cfg";

/// Directory holding the venv's executables
pub fn venv_bin_dir(venv_path: &Path) -> PathBuf {
    venv_path.join(PYTHON_BIN_DIR)
}

/// Check whether `dir` is the root of a virtual environment.
///
/// A missing marker is `Ok(false)`; any other stat failure (permissions,
/// I/O) is returned so callers can tell "not a venv" from "couldn't look".
pub fn has_venv_marker(dir: &Path) -> io::Result<bool> {
    match dir.join(VENV_MARKER_FILE).metadata() {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
