//! Model parameter errors.

use thiserror::Error;

use super::two_state::Regime;

/// Errors raised when validating model parameters.
///
/// # Examples
/// ```
/// use pricer_models::models::{ModelError, Regime};
///
/// let err = ModelError::InvalidVolatility { regime: Regime::Second, value: -0.1 };
/// assert!(err.to_string().contains("regime 2"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelError {
    /// Regime volatility must be positive and finite.
    #[error("Invalid volatility in {regime}: {value} (must be positive)")]
    InvalidVolatility {
        /// Offending regime
        regime: Regime,
        /// The invalid value
        value: f64,
    },

    /// CEV exponent must lie in [0, 1].
    #[error("Invalid CEV exponent in {regime}: {value} (must lie in [0, 1])")]
    InvalidElasticity {
        /// Offending regime
        regime: Regime,
        /// The invalid value
        value: f64,
    },

    /// Transition intensity out of a regime must be non-negative and finite.
    #[error("Invalid transition rate out of {regime}: {value} (must be non-negative)")]
    InvalidTransitionRate {
        /// Regime the transition leaves
        regime: Regime,
        /// The invalid value
        value: f64,
    },

    /// Initial probability of the first regime must lie in [0, 1].
    #[error("Invalid initial probability: {0} (must lie in [0, 1])")]
    InvalidProbability(f64),

    /// Forward level must be positive and finite.
    #[error("Invalid forward: {0} (must be positive)")]
    InvalidForward(f64),
}
