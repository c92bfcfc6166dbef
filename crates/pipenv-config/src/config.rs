//! Buildpack configuration read from the lifecycle environment
//!
//! The CNB lifecycle hands most of its inputs over as positional arguments,
//! but newer platform API versions also export them as `CNB_*` variables.
//! Those are used as fallbacks. `BP_*` variables are user-facing knobs.

use crate::env::ProcessEnv;
use std::path::{Path, PathBuf};

pub const DEFAULT_PIPENV_EXECUTABLE: &str = "pipenv";
pub const DEFAULT_PYTHON_EXECUTABLE: &str = "python";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the buildpack (the directory holding `buildpack.toml`)
    pub buildpack_dir: Option<PathBuf>,
    pub layers_dir: Option<PathBuf>,
    pub platform_dir: Option<PathBuf>,
    /// Where detect writes its build plan
    pub build_plan_path: Option<PathBuf>,
    /// Where build reads the resolved buildpack plan
    pub buildpack_plan_path: Option<PathBuf>,
    pub stack_id: Option<String>,
    /// Raw `BP_LOG_LEVEL`
    pub log_level: Option<String>,
    pub pipenv_executable: String,
    pub python_executable: String,
}

impl Config {
    pub fn from_env(env: &ProcessEnv) -> Self {
        let non_empty = |key: &str| {
            env.get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Config {
            buildpack_dir: env.path_var("CNB_BUILDPACK_DIR"),
            layers_dir: env.path_var("CNB_LAYERS_DIR"),
            platform_dir: env.path_var("CNB_PLATFORM_DIR"),
            build_plan_path: env.path_var("CNB_BUILD_PLAN_PATH"),
            buildpack_plan_path: env.path_var("CNB_BP_PLAN_PATH"),
            stack_id: non_empty("CNB_STACK_ID"),
            log_level: non_empty("BP_LOG_LEVEL"),
            pipenv_executable: non_empty("BP_PIPENV_EXECUTABLE")
                .unwrap_or_else(|| DEFAULT_PIPENV_EXECUTABLE.to_string()),
            python_executable: non_empty("BP_PYTHON_EXECUTABLE")
                .unwrap_or_else(|| DEFAULT_PYTHON_EXECUTABLE.to_string()),
        }
    }

    /// Buildpack root, falling back to the grandparent of the running
    /// binary (`<buildpack>/bin/<exe>`)
    pub fn resolve_buildpack_dir(&self, current_exe: Option<&Path>) -> Option<PathBuf> {
        self.buildpack_dir.clone().or_else(|| {
            current_exe
                .and_then(Path::parent)
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
    }
}

/// Resolve `name` against the snapshot's `PATH`, the way a shell would.
/// Names containing a path separator are checked relative to `cwd`.
pub fn resolve_executable(name: &str, env: &ProcessEnv, cwd: &Path) -> Result<PathBuf, which::Error> {
    which::which_in(name, env.get("PATH"), cwd)
}
