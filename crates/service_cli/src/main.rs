//! regime-pde - Command Line Pricing for the Two-Regime CEV Model
//!
//! This is the operational entry point for the PDE engine.
//!
//! # Commands
//!
//! - `regime-pde price` - Price the configured strikes with the forward PDE
//! - `regime-pde crosscheck` - Compare PDE prices with the Monte Carlo estimator
//! - `regime-pde check` - Validate the configuration and run a smoke solve
//!
//! # Configuration
//!
//! Settings are read from a TOML file (`--config`, or `regime-pde.toml` in
//! the working directory), then `REGIME_PDE_LOG_LEVEL` and `REGIME_PDE_SEED`,
//! then command-line flags; later sources win.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pricer_models::instruments::OptionType;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use error::{CliError, Result};

use config::{build_config, CliOverrides};
use output::OutputFormat;

/// Two-regime CEV PDE pricer
#[derive(Parser)]
#[command(name = "regime-pde")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price the configured strikes
    Price {
        /// Option type (call, put)
        #[arg(short, long, default_value = "call")]
        option: OptionType,

        /// Strikes, overriding the configuration (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        strikes: Option<Vec<f64>>,

        /// Relative forward bump for delta and gamma
        #[arg(short, long)]
        bump: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Compare PDE prices with a Monte Carlo estimate
    Crosscheck {
        /// Option type (call, put)
        #[arg(short, long, default_value = "call")]
        option: OptionType,

        /// Strikes, overriding the configuration (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        strikes: Option<Vec<f64>>,

        /// Number of Monte Carlo paths
        #[arg(short, long)]
        paths: Option<usize>,

        /// Monte Carlo seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Check configuration and run a smoke solve
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut overrides = CliOverrides {
        config_file: cli.config.clone(),
        log_level: cli.log_level.clone(),
        ..CliOverrides::default()
    };
    match &cli.command {
        Commands::Price { strikes, .. } => overrides.strikes = strikes.clone(),
        Commands::Crosscheck {
            strikes,
            paths,
            seed,
            ..
        } => {
            overrides.strikes = strikes.clone();
            overrides.paths = *paths;
            overrides.seed = *seed;
        }
        Commands::Check => {}
    }

    let config = build_config(&overrides).context("failed to load configuration")?;

    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(config.log_level.as_filter_str()))
        .init();
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Price { option, bump, format, .. } => {
            commands::price::run(&config, option, format, bump).context("price failed")?
        }
        Commands::Crosscheck { option, format, .. } => {
            commands::crosscheck::run(&config, option, format).context("cross-check failed")?
        }
        Commands::Check => commands::check::run(&config).context("check failed")?,
    }
    Ok(())
}
