//! Error types for the finite-difference engine.
//!
//! Every failure is reported as a [`PdeError`]. Callers that only need to
//! decide what to do next can match on [`PdeError::kind`]:
//!
//! - `Configuration`: inconsistent or invalid inputs, raised before any time step
//! - `Numerical`: a linear solve broke down at a specific step
//! - `Domain`: a query outside the stored results
//! - `Cancelled`: the caller's budget ran out or a cancellation was requested

use std::fmt;

use pricer_core::market_data::MarketDataError;
use pricer_core::types::{GridError, InterpolationError, LinearSolveError};
use pricer_models::analytical::AnalyticalError;
use pricer_models::models::ModelError;
use thiserror::Error;

/// Broad classification of a [`PdeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Inputs were rejected before solving.
    Configuration,
    /// The discretised system could not be solved.
    Numerical,
    /// A result query fell outside the solved domain.
    Domain,
    /// The solve stopped early at the caller's request.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Numerical => "numerical",
            ErrorKind::Domain => "domain",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Why a solve was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CancelReason {
    /// The step limit was reached.
    StepLimit,
    /// The wall-clock deadline passed.
    Deadline,
    /// A cancellation token was triggered.
    Requested,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CancelReason::StepLimit => "step limit reached",
            CancelReason::Deadline => "deadline exceeded",
            CancelReason::Requested => "cancellation requested",
        };
        f.write_str(text)
    }
}

/// Finite-difference engine errors.
///
/// # Examples
/// ```
/// use pricer_pricing::pde::{ErrorKind, PdeError};
///
/// let err = PdeError::configuration("theta must lie in [0, 1]");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert!(!err.is_retryable());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdeError {
    /// Mesh or grid construction failed.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Inconsistent problem set-up.
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// What was wrong
        message: String,
    },

    /// The linear system at one time step could not be solved.
    #[error("Linear solve failed at step {step} (t = {time}): {source}")]
    Numerical {
        /// Zero-based index of the failing step
        step: usize,
        /// Target time of the failing step
        time: f64,
        /// Underlying solver failure
        source: LinearSolveError,
    },

    /// A coefficient or boundary function produced a NaN or infinity.
    #[error("Non-finite {what} at step {step} (t = {time})")]
    NonFinite {
        /// Which quantity was non-finite
        what: &'static str,
        /// Zero-based index of the failing step
        step: usize,
        /// Time at which it was evaluated
        time: f64,
    },

    /// A results query fell outside the stored domain.
    #[error("Domain error: {0}")]
    Domain(#[from] InterpolationError),

    /// The solve was stopped early.
    #[error("Solve cancelled after {completed_steps} steps: {reason}")]
    Cancelled {
        /// Number of steps fully completed
        completed_steps: usize,
        /// What stopped the solve
        reason: CancelReason,
    },

    /// Model parameters were rejected.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Market data lookup failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// A closed-form reference price could not be computed.
    #[error("Analytical error: {0}")]
    Analytical(#[from] AnalyticalError),
}

impl PdeError {
    /// Shorthand for a [`PdeError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        PdeError::Configuration {
            message: message.into(),
        }
    }

    /// Broad classification of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PdeError::Grid(_)
            | PdeError::Configuration { .. }
            | PdeError::Model(_)
            | PdeError::MarketData(_)
            | PdeError::Analytical(_) => ErrorKind::Configuration,
            PdeError::Numerical { .. } | PdeError::NonFinite { .. } => ErrorKind::Numerical,
            PdeError::Domain(_) => ErrorKind::Domain,
            PdeError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Whether a retry on a refined grid or smaller time step may succeed.
    ///
    /// Nothing inside the engine retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PdeError::Numerical { .. })
    }
}
