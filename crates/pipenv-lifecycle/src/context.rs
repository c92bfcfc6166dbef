//! Inputs the lifecycle hands to detect and build

use crate::buildpack::BuildpackInfo;
use crate::layer::Layers;
use crate::plan::{BuildPlan, BuildpackPlan};
use std::path::PathBuf;

/// Exit code the lifecycle reads as "this buildpack does not apply"
pub const DETECT_FAIL_EXIT_CODE: i32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectContext {
    pub working_dir: PathBuf,
    pub cnb_path: PathBuf,
    pub platform: Platform,
    pub buildpack_info: BuildpackInfo,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildContext {
    pub buildpack_info: BuildpackInfo,
    pub working_dir: PathBuf,
    pub cnb_path: PathBuf,
    pub plan: BuildpackPlan,
    pub platform: Platform,
    pub layers: Layers,
    pub stack: Option<String>,
}

/// Result of a detect run that did not error
#[derive(Debug, Clone, PartialEq)]
pub enum DetectOutcome<M = toml::Table> {
    Pass(BuildPlan<M>),
    /// Not applicable; the optional reason is shown to the user
    Fail { reason: Option<String> },
}

impl<M> DetectOutcome<M> {
    pub fn fail_with(reason: impl Into<String>) -> Self {
        DetectOutcome::Fail {
            reason: Some(reason.into()),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, DetectOutcome::Pass(_))
    }
}
