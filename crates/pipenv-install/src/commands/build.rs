use super::{buildpack_dir, working_dir};
use crate::build::Build;
use crate::clock::Clock;
use crate::common::GlobalOpts;
use crate::entry_resolver::PlanEntryResolver;
use crate::executable::PathExecutable;
use crate::install_process::PipenvInstallProcess;
use crate::sbom_generator::PipfileLockSbomGenerator;
use crate::site_process::SiteProcess;
use crate::venv_locator::VenvLocator;
use anyhow::{anyhow, Result};
use clap::Args;
use pipenv_config::{Config, ProcessEnv};
use pipenv_lifecycle::{BuildContext, BuildpackInfo, BuildpackPlan, Layers, Platform};
use pipenv_logger::Emitter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Layers directory (defaults to CNB_LAYERS_DIR)
    pub layers: Option<PathBuf>,
    /// Platform directory (defaults to CNB_PLATFORM_DIR)
    pub platform: Option<PathBuf>,
    /// Buildpack plan to read (defaults to CNB_BP_PLAN_PATH)
    pub plan: Option<PathBuf>,
}

pub fn handle_build(args: BuildArgs, opts: &GlobalOpts, env: &ProcessEnv) -> Result<()> {
    let config = Config::from_env(env);
    let logger = Arc::new(Emitter::stdout().with_level(opts.emitter_level(config.log_level.as_deref())));

    let cnb_path = buildpack_dir(&config)?;
    let layers_dir = args
        .layers
        .or_else(|| config.layers_dir.clone())
        .ok_or_else(|| anyhow!("no layers directory given and CNB_LAYERS_DIR is unset"))?;
    let plan_path = args
        .plan
        .or_else(|| config.buildpack_plan_path.clone())
        .ok_or_else(|| anyhow!("no buildpack plan given and CNB_BP_PLAN_PATH is unset"))?;

    let context = BuildContext {
        buildpack_info: BuildpackInfo::load(&cnb_path)?,
        working_dir: working_dir()?,
        cnb_path,
        plan: BuildpackPlan::load(&plan_path)?,
        platform: Platform {
            path: args.platform.or_else(|| config.platform_dir.clone()).unwrap_or_default(),
        },
        layers: Layers::new(layers_dir),
        stack: config.stack_id.clone(),
    };
    debug!(
        "Building {} with pipenv '{}' and python '{}'",
        context.working_dir.display(),
        config.pipenv_executable,
        config.python_executable
    );

    let install_process = PipenvInstallProcess::new(
        Box::new(PathExecutable::new(&config.pipenv_executable)),
        Box::new(VenvLocator::new()),
        env.clone(),
        Arc::clone(&logger),
    );
    let site_process = SiteProcess::new(Box::new(PathExecutable::new(&config.python_executable)), env.clone());

    let build = Build::new(
        Box::new(PlanEntryResolver::new()),
        Box::new(install_process),
        Box::new(site_process),
        Box::new(VenvLocator::new()),
        Box::new(PipfileLockSbomGenerator::new()),
        Clock::system(),
        logger,
    );

    let result = build.run(&context)?;
    context.layers.write_result(&result)?;
    Ok(())
}
