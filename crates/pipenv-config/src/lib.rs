//! Configuration for the pipenv-install buildpack
//!
//! Shared by the lifecycle plumbing and the buildpack itself:
//! - the process environment snapshot handed to subprocesses
//! - `CNB_*` / `BP_*` configuration
//! - virtual environment path conventions

pub mod config;
pub mod env;
pub mod venv_paths;

pub use config::{resolve_executable, Config};
pub use env::ProcessEnv;
