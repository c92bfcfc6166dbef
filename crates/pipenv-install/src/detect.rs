//! Detect phase
//!
//! Passes for any application with a `Pipfile`. The plan provides
//! `site-packages` and requires `cpython` and `pipenv` at build time; the
//! `cpython` requirement carries the Python version from `Pipfile.lock`
//! when one exists, otherwise from `Pipfile`.

use crate::constants::{CPYTHON, PIPENV, SITE_PACKAGES};
use crate::errors::DetectError;
use pipenv_lifecycle::{BuildPlan, BuildPlanProvision, BuildPlanRequirement, DetectContext, DetectOutcome};
use pipenv_manifest::{ManifestError, VersionParser, PIPFILE, PIPFILE_LOCK};
use serde::Serialize;
use std::fs;
use std::io;
use tracing::debug;

/// Where a requested Python version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    Manifest,
    Lock,
}

/// Metadata attached to every requirement in the build plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementMetadata {
    pub build: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "version-source", skip_serializing_if = "Option::is_none")]
    pub version_source: Option<VersionSource>,
}

impl RequirementMetadata {
    fn build_only() -> Self {
        RequirementMetadata {
            build: true,
            ..Default::default()
        }
    }
}

pub struct Detect {
    pipfile_parser: Box<dyn VersionParser>,
    lock_parser: Box<dyn VersionParser>,
}

impl Detect {
    pub fn new(pipfile_parser: Box<dyn VersionParser>, lock_parser: Box<dyn VersionParser>) -> Self {
        Detect {
            pipfile_parser,
            lock_parser,
        }
    }

    pub fn run(&self, context: &DetectContext) -> Result<DetectOutcome<RequirementMetadata>, DetectError> {
        let pipfile = context.working_dir.join(PIPFILE);
        match fs::metadata(&pipfile) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No Pipfile in {}", context.working_dir.display());
                return Ok(DetectOutcome::fail_with(format!(
                    "no '{}' found in {}",
                    PIPFILE,
                    context.working_dir.display()
                )));
            }
            Err(e) => return Err(DetectError::PipfileStat(e)),
        }

        let lock = context.working_dir.join(PIPFILE_LOCK);
        let (parser, source) = match fs::metadata(&lock) {
            Ok(_) => (self.lock_parser.as_ref(), VersionSource::Lock),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                (self.pipfile_parser.as_ref(), VersionSource::Manifest)
            }
            Err(e) => {
                return Ok(DetectOutcome::fail_with(format!(
                    "failed trying to stat {}: {}",
                    PIPFILE_LOCK, e
                )));
            }
        };

        let mut cpython = RequirementMetadata::build_only();
        if let Some(version) = soft_parse(parser, context)? {
            cpython.version = Some(version);
            cpython.version_source = Some(source);
        }
        debug!("Python requirement: {:?}", cpython);

        Ok(DetectOutcome::Pass(BuildPlan {
            provides: vec![BuildPlanProvision {
                name: SITE_PACKAGES.to_string(),
            }],
            requires: vec![
                BuildPlanRequirement {
                    name: CPYTHON.to_string(),
                    metadata: cpython,
                },
                BuildPlanRequirement {
                    name: PIPENV.to_string(),
                    metadata: RequirementMetadata::build_only(),
                },
            ],
        }))
    }
}

/// A missing file means "no constraint"; an empty version is treated the
/// same way.
fn soft_parse(parser: &dyn VersionParser, context: &DetectContext) -> Result<Option<String>, ManifestError> {
    match parser.parse_version(&context.working_dir) {
        Ok(version) => Ok(version.filter(|v| !v.is_empty())),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
