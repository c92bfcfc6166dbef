//! pipenv-install: a Cloud Native Buildpack that installs the dependencies
//! of a Pipfile-based Python application with pipenv.
//!
//! Detect passes when the application has a `Pipfile` and asks for the
//! `cpython` and `pipenv` dependencies at build time. Build runs
//! `pipenv install` into a `packages` layer, keeps pipenv's download cache
//! in a `cache` layer and exposes the virtualenv through `PATH` and
//! `PYTHONPATH`.

pub mod build;
pub mod clock;
pub mod commands;
pub mod common;
pub mod constants;
pub mod detect;
pub mod entry_resolver;
pub mod errors;
pub mod executable;
pub mod install_process;
pub mod sbom_generator;
pub mod site_process;
pub mod venv_locator;

#[cfg(test)]
mod fakes;

pub use build::Build;
pub use common::{route_args, GlobalOpts};
pub use detect::{Detect, RequirementMetadata, VersionSource};
pub use errors::{BuildError, DetectError};
