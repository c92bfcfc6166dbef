use super::{buildpack_dir, working_dir};
use crate::detect::Detect;
use anyhow::{anyhow, Result};
use clap::Args;
use pipenv_config::{Config, ProcessEnv};
use pipenv_lifecycle::{
    write_build_plan, BuildpackInfo, DetectContext, DetectOutcome, Platform, DETECT_FAIL_EXIT_CODE,
};
use pipenv_manifest::{PipfileLockParser, PipfileParser};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug, Default)]
pub struct DetectArgs {
    /// Platform directory (defaults to CNB_PLATFORM_DIR)
    pub platform: Option<PathBuf>,
    /// Where to write the build plan (defaults to CNB_BUILD_PLAN_PATH)
    pub plan: Option<PathBuf>,
}

/// Run detection and return the lifecycle exit code
pub fn handle_detect(args: DetectArgs, env: &ProcessEnv) -> Result<i32> {
    let config = Config::from_env(env);
    let cnb_path = buildpack_dir(&config)?;
    let plan_path = args
        .plan
        .or_else(|| config.build_plan_path.clone())
        .ok_or_else(|| anyhow!("no build plan path given and CNB_BUILD_PLAN_PATH is unset"))?;

    let context = DetectContext {
        working_dir: working_dir()?,
        buildpack_info: BuildpackInfo::load(&cnb_path)?,
        cnb_path,
        platform: Platform {
            path: args.platform.or(config.platform_dir).unwrap_or_default(),
        },
        stack: config.stack_id,
    };
    debug!("Detecting in {}", context.working_dir.display());

    let detect = Detect::new(Box::new(PipfileParser::new()), Box::new(PipfileLockParser::new()));
    match detect.run(&context)? {
        DetectOutcome::Pass(plan) => {
            write_build_plan(&plan, &plan_path)?;
            Ok(0)
        }
        DetectOutcome::Fail { reason } => {
            if let Some(reason) = reason {
                println!("{}", reason);
            }
            Ok(DETECT_FAIL_EXIT_CODE)
        }
    }
}
