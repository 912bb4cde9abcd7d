//! Core error types.
//!
//! This module provides:
//! - `error`: Structured error types for meshing, grid construction,
//!   banded linear solves and interpolation
//!
//! # Re-exports
//!
//! For convenience, the error types are re-exported at this module level:
//! [`GridError`], [`LinearSolveError`], [`InterpolationError`].

pub mod error;

pub use error::{GridError, InterpolationError, LinearSolveError};
