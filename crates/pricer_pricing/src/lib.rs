//! # Pricer Engine (Layer 3: Numerical Engines)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing turns the meshes, grids and banded solvers of
//! `pricer_core` and the model parameters of `pricer_models` into prices:
//! - Theta-method finite-difference solvers for one equation and for two
//!   linearly coupled equations (`pde`)
//! - Pricers for the two-state Markov-chain CEV model and the single-regime
//!   CEV model (`pricer`)
//! - A Monte Carlo estimator used to cross-check the PDE prices (`mc`)
//! - Seeded random numbers for the estimator (`rng`)
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pricer_core::math::grid::PdeGrid;
//! use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
//! use pricer_pricing::pde::{BoundaryCondition, PdeCoefficients, PdeProblem, ThetaMethodSolver};
//!
//! // u_t = u_xx on [0, π] with u = 0 at both ends
//! let time = UniformMesh::new(0.0, 0.5, 51).unwrap().generate().unwrap();
//! let space = UniformMesh::new(0.0, std::f64::consts::PI, 81).unwrap().generate().unwrap();
//! let grid = Arc::new(PdeGrid::new(time, space).unwrap());
//!
//! let problem = PdeProblem::from_fn(
//!     grid,
//!     PdeCoefficients::constant(1.0, 0.0, 0.0),
//!     f64::sin,
//!     BoundaryCondition::dirichlet(0.0, |_| 0.0),
//!     BoundaryCondition::dirichlet(std::f64::consts::PI, |_| 0.0),
//! )
//! .unwrap();
//! let results = ThetaMethodSolver::default().solve(&problem).unwrap();
//!
//! // Backward stepping: the value at t = 0 has decayed by e^{-0.5}.
//! let mid = results.interpolate(std::f64::consts::FRAC_PI_2, 0.0).unwrap();
//! assert!((mid - (-0.5_f64).exp()).abs() < 1e-3);
//! ```
//!
//! ## Concurrency
//!
//! Grids are shared behind `Arc`, problems and solvers are `Send + Sync`,
//! and independent solves (strike ladders, bumped forwards, Monte Carlo
//! batches) run on the rayon thread pool. Long solves can be bounded with a
//! [`pde::SolveBudget`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
// Allow unknown lints for clippy compatibility across versions
#![allow(unknown_lints)]

pub mod mc;
pub mod pde;
pub mod pricer;
pub mod rng;

// Re-export commonly used items for convenience
pub use mc::{MarkovChainMonteCarlo, McEstimate, MonteCarloConfig};
pub use pde::{PdeError, ResultsGrid, SolverConfig, ThetaMethodSolver};
pub use pricer::{CevPdePricer, StrikeQuote, TwoStateMarkovChainPricer};
