//! shmgr - versioned shell library loader
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use shmgr::cli::{Cli, Commands};
use shmgr::config::{Config, ConfigManager};
use shmgr::error::ShmgrResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
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

async fn run() -> ShmgrResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    // Logging is not up yet; a broken config is reported by main
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Load(args) => shmgr::cli::commands::load(args, &config).await,
        Commands::List(args) => shmgr::cli::commands::list(args, &config).await,
        Commands::Cache(args) => shmgr::cli::commands::cache(args, &config).await,
    }
}

/// Logs go to stderr: 0 = warn, 1 = info, 2+ = debug. `RUST_LOG` wins.
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 => "shmgr=warn",
        1 => "shmgr=info",
        _ => "shmgr=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
