use clap::{Parser, Subcommand};
use colored::Colorize;
use pipenv_config::ProcessEnv;
use pipenv_install::commands::{
    build::{self, BuildArgs},
    detect::{self, DetectArgs},
};
use pipenv_install::{route_args, GlobalOpts};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipenv-install")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Pipenv install buildpack",
    long_about = "Cloud Native Buildpack that installs Pipfile dependencies with pipenv."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether this buildpack applies and write the build plan
    Detect(DetectArgs),
    /// Install the dependencies into the packages layer
    Build(BuildArgs),
}

fn main() {
    let env = ProcessEnv::capture();
    let cli = Cli::parse_from(route_args(std::env::args_os()));
    init_logging(&cli.global, env.get("BP_LOG_LEVEL"));

    let code = match cli.command {
        Commands::Detect(args) => detect::handle_detect(args, &env),
        Commands::Build(args) => build::handle_build(args, &cli.global, &env).map(|()| 0),
    };

    match code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(opts: &GlobalOpts, bp_log_level: Option<&str>) {
    let default_filter = opts.tracing_filter(bp_log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}
