//! Running `pipenv install` into the packages layer

use crate::constants::PATH_DELIMITER;
use crate::errors::BuildError;
use crate::executable::{Executable, Execution};
use crate::venv_locator::VenvDirLocator;
use pipenv_config::venv_paths::venv_bin_dir;
use pipenv_config::ProcessEnv;
use pipenv_lifecycle::Layer;
use pipenv_logger::Emitter;
use pipenv_manifest::PIPFILE_LOCK;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub trait InstallProcess {
    /// Install the dependencies declared in `working_dir` into
    /// `target_layer`, using `cache_layer` as the download cache
    fn execute(&self, working_dir: &Path, target_layer: &mut Layer, cache_layer: &Layer) -> Result<(), BuildError>;
}

pub struct PipenvInstallProcess {
    executable: Box<dyn Executable>,
    venv_locator: Box<dyn VenvDirLocator>,
    env: ProcessEnv,
    logger: Arc<Emitter>,
}

impl PipenvInstallProcess {
    pub fn new(
        executable: Box<dyn Executable>,
        venv_locator: Box<dyn VenvDirLocator>,
        env: ProcessEnv,
        logger: Arc<Emitter>,
    ) -> Self {
        PipenvInstallProcess {
            executable,
            venv_locator,
            env,
            logger,
        }
    }

    fn run(&self, args: &[&str], working_dir: &Path, env: &ProcessEnv) -> Result<(), BuildError> {
        let command = format!("pipenv {}", args.join(" "));
        self.logger.subprocess(&format!("Running '{}'", command));

        let execution = Execution::new(args.iter().copied())
            .with_env(env.clone())
            .with_dir(working_dir)
            .with_merged_output();

        match self.executable.execute(&execution) {
            Ok(output) => {
                self.logger.capture_output(&command, &output.stdout, &output.stderr);
                Ok(())
            }
            Err(source) => {
                let output = source.output().map(|o| o.combined()).unwrap_or_default();
                Err(BuildError::Command {
                    command: format!("pipenv {}", args.first().copied().unwrap_or_default()),
                    output,
                    source,
                })
            }
        }
    }
}

fn lock_file_present(working_dir: &Path) -> Result<bool, BuildError> {
    match fs::metadata(working_dir.join(PIPFILE_LOCK)) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::LockFileStat(e)),
    }
}

impl InstallProcess for PipenvInstallProcess {
    fn execute(&self, working_dir: &Path, target_layer: &mut Layer, cache_layer: &Layer) -> Result<(), BuildError> {
        let locked = lock_file_present(working_dir)?;
        // --deploy aborts when Pipfile and Pipfile.lock disagree
        let args: &[&str] = if locked {
            &["install", "--deploy"]
        } else {
            &["install", "--skip-lock"]
        };

        // pipenv ignores PYTHONUSERBASE; WORKON_HOME places the virtualenv
        let env = self
            .env
            .clone()
            .with("PIP_USER", "1")
            .with("WORKON_HOME", target_layer.path.display().to_string())
            .with("PIPENV_CACHE_DIR", cache_layer.path.display().to_string());

        self.run(args, working_dir, &env)?;

        let venv_dir = self.venv_locator.locate_venv_dir(&target_layer.path)?;
        debug!("pipenv created {}", venv_dir.display());

        // clean without a lock file would generate one
        if locked {
            self.run(&["clean"], working_dir, &env)?;
        }

        target_layer
            .shared_env
            .prepend("PATH", venv_bin_dir(&venv_dir).display().to_string(), PATH_DELIMITER);
        target_layer
            .shared_env
            .set_default("PYTHONUSERBASE", venv_dir.display().to_string());

        self.logger.debug("Configuring environment");
        self.logger.debug(&target_layer.shared_env.formatted());
        Ok(())
    }
}
