//! Numerical building blocks for finite-difference pricing.
//!
//! - [`meshing`]: One-dimensional node generators (uniform, exponential, hyperbolic)
//! - [`grid`]: Time/space grid with cached non-uniform stencil weights
//! - [`linalg`]: Tridiagonal and 2x2 block-tridiagonal solvers
//! - [`interpolators`]: One-dimensional interpolation stencils and interpolators

pub mod grid;
pub mod interpolators;
pub mod linalg;
pub mod meshing;

/// Magnitude below which a vanishing denominator is replaced by its
/// analytic limit (e.g. `σ√T → 0`, `λ12 + λ21 → 0`).
pub const SINGULARITY_THRESHOLD: f64 = 1e-16;
