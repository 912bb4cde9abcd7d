//! Error types for structured error handling.
//!
//! This module provides:
//! - `GridError`: Configuration errors from mesh and grid construction
//! - `LinearSolveError`: Numerical errors from banded linear solves
//! - `InterpolationError`: Errors from interpolation operations

use thiserror::Error;

/// Mesh and grid construction errors.
///
/// These are configuration errors: they are raised eagerly when a mesh or
/// grid is built and never from inside a time-stepping loop.
///
/// # Variants
/// - `TooFewPoints`: Fewer nodes than the discretisation requires
/// - `InvalidDomain`: `start >= end` or non-finite bounds
/// - `InvalidConcentration`: Concentration parameter outside its valid range
/// - `NonMonotonic`: Nodes are not strictly increasing
/// - `NonFinite`: A node is NaN or infinite
/// - `FixedPointOutOfRange`: A pinned point lies outside the open domain
/// - `FixedPointsTooClose`: Two pinned points crowd into one mesh cell
///
/// # Examples
/// ```
/// use pricer_core::types::GridError;
///
/// let err = GridError::TooFewPoints { got: 2, need: 3 };
/// assert_eq!(format!("{}", err), "Too few mesh points: got 2, need at least 3");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GridError {
    /// Fewer points than required.
    #[error("Too few mesh points: got {got}, need at least {need}")]
    TooFewPoints {
        /// Number of points requested
        got: usize,
        /// Minimum number of points
        need: usize,
    },

    /// Domain bounds are inverted, empty or non-finite.
    #[error("Invalid domain: start {start} must be finite and less than end {end}")]
    InvalidDomain {
        /// Lower bound
        start: f64,
        /// Upper bound
        end: f64,
    },

    /// Concentration parameter outside its valid range.
    #[error("Invalid concentration {value}: {reason}")]
    InvalidConcentration {
        /// The offending value
        value: f64,
        /// What the family requires
        reason: &'static str,
    },

    /// Nodes are not strictly increasing.
    #[error("Mesh is not strictly increasing at index {index}")]
    NonMonotonic {
        /// Index of the first node not greater than its predecessor
        index: usize,
    },

    /// A node is NaN or infinite.
    #[error("Non-finite mesh value at index {index}")]
    NonFinite {
        /// Index of the offending node
        index: usize,
    },

    /// A fixed point cannot be placed inside the mesh.
    #[error("Fixed point {point} outside open domain ({start}, {end})")]
    FixedPointOutOfRange {
        /// The requested point
        point: f64,
        /// Lower bound
        start: f64,
        /// Upper bound
        end: f64,
    },

    /// A fixed point would sit closer to another fixed node than the mesh
    /// spacing allows.
    #[error("Fixed point {second} is too close to fixed node {first} for the mesh spacing")]
    FixedPointsTooClose {
        /// The fixed node already in place (a mesh endpoint or an earlier point)
        first: f64,
        /// The point that could not be placed
        second: f64,
    },
}

/// Banded linear solve errors.
///
/// These are numerical errors: the system was well-formed but could not be
/// solved to a finite result.
///
/// # Examples
/// ```
/// use pricer_core::types::LinearSolveError;
///
/// let err = LinearSolveError::SingularPivot { row: 4, pivot: 1e-20 };
/// assert!(format!("{}", err).contains("row 4"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinearSolveError {
    /// Pivot magnitude fell below the singularity threshold.
    #[error("Singular pivot {pivot} at row {row}")]
    SingularPivot {
        /// Row of the failing pivot
        row: usize,
        /// Pivot value (determinant for block systems)
        pivot: f64,
    },

    /// The solution contains a NaN or infinite value.
    #[error("Non-finite solution value at row {row}")]
    NonFinite {
        /// Row of the first non-finite value
        row: usize,
    },

    /// Band arrays have inconsistent lengths.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },
}

/// Interpolation-related errors.
///
/// Provides structured error handling for interpolation operations
/// with descriptive context for each failure mode.
///
/// # Variants
/// - `OutOfBounds`: Query point outside valid interpolation domain
/// - `InsufficientData`: Not enough data points for interpolation
/// - `NonMonotonicData`: Data violates monotonicity requirement
/// - `InvalidInput`: General invalid input error
///
/// # Examples
/// ```
/// use pricer_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Data is not monotonic when monotonicity is required.
    #[error("Data is not monotonic at index {index}")]
    NonMonotonicData {
        /// Index where monotonicity violation was detected
        index: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
