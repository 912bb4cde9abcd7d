//! Error types for the Monte Carlo estimator.

use pricer_models::analytical::AnalyticalError;
use pricer_models::models::ModelError;
use thiserror::Error;

/// Rejected simulation settings or pricing inputs.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A count lies outside its admissible range.
    #[error("{name} = {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Setting name.
        name: &'static str,
        /// Rejected value.
        value: usize,
        /// Smallest admissible value.
        min: usize,
        /// Largest admissible value.
        max: usize,
    },
    /// A pricing input such as the expiry or a strike is unusable.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// Errors raised while running the estimator.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum McError {
    /// Simulation settings were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Model parameters were rejected.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Conditional Black pricing failed.
    #[error("Analytical error: {0}")]
    Analytical(#[from] AnalyticalError),
}
