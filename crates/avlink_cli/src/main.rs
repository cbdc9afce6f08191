//! AVLink CLI
//!
//! Command-line tools for the AVLink driver.
//!
//! # Commands
//!
//! - `check` - Validate a driver configuration file
//! - `simulate` - Run a loopback simulation of the deferred-update flow
//! - `version` - Show version information

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// AVLink driver command-line tools.
#[derive(Parser)]
#[command(name = "avlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a driver configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Run a loopback simulation of the deferred-update flow
    Simulate {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Seconds before the simulated hub subscribes the entities
        #[arg(short, long, default_value_t = 5)]
        subscribe_after: u64,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Check { config } => {
            commands::check::run(&config)?;
        }
        Commands::Simulate {
            config,
            subscribe_after,
        } => {
            commands::simulate::run(&config, Duration::from_secs(subscribe_after)).await?;
        }
        Commands::Version => {
            println!("AVLink CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
