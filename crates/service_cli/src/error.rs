//! CLI error types.

use std::path::PathBuf;

use pricer_pricing::mc::McError;
use pricer_pricing::pde::PdeError;
use thiserror::Error;

/// Errors surfaced by the `regime-pde` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file is missing.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Configuration could not be read or parsed, or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command-line argument is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The PDE engine rejected the problem or failed to solve it.
    #[error(transparent)]
    Pde(#[from] PdeError),

    /// The Monte Carlo estimator failed.
    #[error(transparent)]
    MonteCarlo(#[from] McError),

    /// PDE and Monte Carlo prices disagree.
    #[error("Cross-check failed at {failures} of {total} strikes")]
    CrossCheckFailed {
        /// Strikes outside tolerance
        failures: usize,
        /// Strikes compared
        total: usize,
    },

    /// Writing the results failed.
    #[error("Output error: {0}")]
    Output(String),

    /// Terminal or file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
