//! Asking the interpreter where user site-packages live

use crate::errors::BuildError;
use crate::executable::{Executable, Execution};
use pipenv_config::ProcessEnv;
use std::path::{Path, PathBuf};

pub trait SitePackagesProcess {
    /// Site-packages directory of a user base rooted at `layer_path`
    fn execute(&self, layer_path: &Path) -> Result<PathBuf, BuildError>;
}

/// Runs `python -m site --user-site` with `PYTHONUSERBASE` pointed at the
/// layer
pub struct SiteProcess {
    executable: Box<dyn Executable>,
    env: ProcessEnv,
}

impl SiteProcess {
    pub fn new(executable: Box<dyn Executable>, env: ProcessEnv) -> Self {
        SiteProcess { executable, env }
    }
}

impl SitePackagesProcess for SiteProcess {
    fn execute(&self, layer_path: &Path) -> Result<PathBuf, BuildError> {
        let execution = Execution::new(["-m", "site", "--user-site"])
            .with_env(self.env.clone().with("PYTHONUSERBASE", layer_path.display().to_string()));

        let output = self.executable.execute(&execution).map_err(|source| BuildError::SitePackages {
            stderr: source.output().map(|o| o.stderr.clone()).unwrap_or_default(),
            source,
        })?;

        let site = output.stdout.trim_end();
        if site.is_empty() {
            return Err(BuildError::SitePackagesEmpty);
        }
        Ok(PathBuf::from(site))
    }
}
