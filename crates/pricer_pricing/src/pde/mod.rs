//! # Finite-Difference Engine
//!
//! Theta-method solvers for linear parabolic equations
//!
//! ```text
//! ∂V/∂t = a(x, t) ∂²V/∂x² + b(x, t) ∂V/∂x + c(x, t) V
//! ```
//!
//! on the non-uniform grids of [`pricer_core::math::grid`].
//!
//! ## Data Flow
//!
//! ```text
//! Mesh ─▶ PdeGrid ─▶ (PdeCoefficients, BoundaryCondition) ─▶ PdeProblem
//!                                                              │
//!                     ResultsGrid ◀── ThetaMethodSolver ◀──────┘
//! ```
//!
//! Every stage is immutable once built. Grids and coefficients are shared
//! read-only (`Arc`), each solve owns its buffers and the
//! [`ResultsGrid`] it returns, so independent solves may run on separate
//! threads.
//!
//! ## Module Structure
//!
//! - [`coefficients`]: operator coefficients `a`, `b`, `c`
//! - [`boundary`] / [`boundary_2d`]: Dirichlet and Neumann conditions
//! - [`config`]: θ, direction, storage and Rannacher start-up
//! - [`solver`]: scalar theta-method solver
//! - [`coupled`]: two-state solver with linear coupling
//! - [`results`]: solution surfaces with 2D interpolation
//! - [`budget`]: step/time limits and cooperative cancellation
//! - [`error`]: error taxonomy

pub mod boundary;
pub mod boundary_2d;
pub mod budget;
pub mod coefficients;
pub mod config;
pub mod coupled;
pub mod error;
pub mod results;
pub mod solver;

pub use boundary::{BoundaryCondition, BoundaryFn, BoundaryRow};
pub use boundary_2d::{BoundaryCondition2D, SurfaceBoundaryFn};
pub use budget::{CancellationToken, SolveBudget};
pub use coefficients::{CoefficientFn, PdeCoefficients};
pub use config::{
    ResultsStorage, SolverConfig, SolverConfigBuilder, TimeDirection, DEFAULT_IMPLICIT_START_STEPS,
    DEFAULT_THETA,
};
pub use coupled::{CoupledPdeProblem, CoupledThetaSolver};
pub use error::{CancelReason, ErrorKind, PdeError};
pub use results::ResultsGrid;
pub use solver::{PdeProblem, ThetaMethodSolver};
