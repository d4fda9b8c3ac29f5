//! pylayer - CPython layer builder
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use pylayer::cli::args::{ConfigAction, ConfigArgs};
use pylayer::cli::{Cli, Commands};
use pylayer::config::{Config, ConfigManager};
use pylayer::error::PylayerResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PylayerResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    // `config init` must work even when the existing file is invalid
    let config = match cli.command {
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. }),
        }) => Config::default(),
        _ => config_manager.load().await?,
    };

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("pylayer=warn"),
        1 => EnvFilter::new("pylayer=info"),
        _ => EnvFilter::new("pylayer=debug"),
    };

    // Diagnostics go to stderr; stdout carries the build log
    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }

    match cli.command {
        Commands::Build(args) => pylayer::cli::commands::build(args, &config).await,
        Commands::Resolve(args) => pylayer::cli::commands::resolve(args, &config).await,
        Commands::Catalog(args) => pylayer::cli::commands::catalog(args, &config).await,
        Commands::Layer(args) => pylayer::cli::commands::layer(args, &config).await,
        Commands::Config(args) => {
            pylayer::cli::commands::config(args, &config_manager, &config).await
        }
    }
}
