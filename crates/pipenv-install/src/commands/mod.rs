pub mod build;
pub mod detect;

use anyhow::{anyhow, Result};
use pipenv_config::Config;
use std::path::PathBuf;

fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| anyhow!("failed to get working directory: {}", e))
}

fn buildpack_dir(config: &Config) -> Result<PathBuf> {
    let current_exe = std::env::current_exe().ok();
    config
        .resolve_buildpack_dir(current_exe.as_deref())
        .ok_or_else(|| anyhow!("could not determine the buildpack directory, set CNB_BUILDPACK_DIR"))
}
