//! Common types and utilities shared across commands

use clap::Parser;
use pipenv_logger::Level;
use std::ffi::OsString;
use std::path::Path;

/// Name of the binary when invoked directly
pub const PROGRAM_NAME: &str = "pipenv-install";

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Build log level: `-v` or `BP_LOG_LEVEL=DEBUG` turn on debug output
    pub fn emitter_level(&self, bp_log_level: Option<&str>) -> Level {
        if self.quiet {
            return Level::Info;
        }
        if self.verbose > 0 {
            Level::Debug
        } else {
            Level::from_bp_log_level(bp_log_level)
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn tracing_filter(&self, bp_log_level: Option<&str>) -> &'static str {
        match (self.verbosity_level(), self.emitter_level(bp_log_level)) {
            (0, _) if self.quiet => "pipenv_install=error",
            (0, Level::Info) => "pipenv_install=warn",
            (0 | 1, _) => "pipenv_install=debug,pipenv_lifecycle=debug,pipenv_manifest=debug",
            _ => "pipenv_install=trace,pipenv_lifecycle=trace,pipenv_manifest=trace,pipenv_config=trace",
        }
    }
}

/// The buildpack ships `bin/detect` and `bin/build` as symlinks to this
/// binary. When invoked through one, the link name becomes the subcommand.
pub fn route_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let Some(program) = args.next() else {
        return vec![OsString::from(PROGRAM_NAME)];
    };

    let invoked_as = Path::new(&program)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);

    let mut routed = vec![program];
    if let Some(name @ ("detect" | "build")) = invoked_as.as_deref() {
        routed.push(OsString::from(name));
    }
    routed.extend(args);
    routed
}
