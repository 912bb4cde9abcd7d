//! # pricer_core: Numerical Foundation for Finite-Difference Pricing
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core serves as the bottom layer of the workspace, providing:
//! - Mesh generators: uniform, exponential, hyperbolic (`math::meshing`)
//! - Time/space grid with cached non-uniform stencils (`math::grid`)
//! - Tridiagonal and 2x2 block-tridiagonal solvers (`math::linalg`)
//! - 1D interpolation and axis weights for 2D lookup (`math::interpolators`)
//! - Yield curves used for discounting (`market_data`)
//! - Error types: `GridError`, `LinearSolveError`, `InterpolationError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - nalgebra: Fixed-size 2x2 blocks for coupled systems
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::grid::PdeGrid;
//! use pricer_core::math::meshing::{ExponentialMesh, HyperbolicMesh, MeshGenerator};
//!
//! let time = ExponentialMesh::new(0.0, 5.0, 51, 7.5).unwrap().generate().unwrap();
//! let space = HyperbolicMesh::new(0.0, 0.3, 0.03, 151, 0.01)
//!     .unwrap()
//!     .generate()
//!     .unwrap();
//!
//! let grid = PdeGrid::new(time, space).unwrap();
//! assert!((grid.space_spacing_sum() - 0.3).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for error types and method enums

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
