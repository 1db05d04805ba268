//! Command-line interface for log-generator
//!
//! # Usage Examples
//!
//! ```bash
//! # Generate logs for every source in a directory
//! log-generator ./config
//!
//! # Single source file, empty the target file first, verbose logging
//! log-generator ./config/access.yaml --truncate --level debug
//!
//! # Validate configuration files and exit
//! log-generator ./config --check
//! ```
//!
//! ## Signals
//! - `SIGHUP`: reload configuration (never truncates)
//! - `SIGUSR1`: reload configuration and truncate the target files
//! - `SIGINT` / `SIGTERM`: stop after workers finish their current line

use anyhow::Context;
use clap::Parser;
use log_generator::{check_config, signals, Supervisor};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "log-generator")]
#[command(about = "Generate log events from source configuration files")]
#[command(long_about = None)]
struct Cli {
    /// Path to configuration directory or file
    #[arg(value_name = "CONFIG_PATH", env = "LOG_GENERATOR_CONFIG")]
    config_path: PathBuf,

    /// Logging level (overridden by RUST_LOG when set)
    #[arg(long, short, default_value = "info", env = "LOG_GENERATOR_LEVEL")]
    level: String,

    /// Truncate the log files on start
    #[arg(long, short)]
    truncate: bool,

    /// Validate the configuration files and exit without generating
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cli.level)
            .with_context(|| format!("Invalid logging level: {}", cli.level))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.check {
        let report = check_config(&cli.config_path)?;
        anyhow::ensure!(
            report.is_ok(),
            "{} of {} configuration file(s) are invalid",
            report.invalid.len(),
            report.invalid.len() + report.valid.len()
        );
        return Ok(());
    }

    let supervisor = Supervisor::new(&cli.config_path, cli.truncate);
    signals::install(supervisor.handle())?;

    supervisor.run().await
}
