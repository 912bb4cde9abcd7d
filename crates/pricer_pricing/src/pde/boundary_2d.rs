//! Boundary conditions for families of solution slices indexed by a second
//! coordinate `y` (regime index, surface parameter).
//!
//! Unlike [`BoundaryCondition`](super::BoundaryCondition), the Neumann row is
//! already divided by the boundary spacing, so its constant is the raw
//! derivative `g(t, y)`.

use std::fmt;
use std::sync::Arc;

use pricer_core::math::grid::PdeGrid;

use super::boundary::BoundaryRow;
use super::coefficients::PdeCoefficients;
use super::error::PdeError;

/// Boundary function of `(t, y)`.
pub type SurfaceBoundaryFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Boundary condition at one edge of the space mesh for a surface of slices.
///
/// - `Dirichlet`: row `[1]`, constant `f(t, y)`
/// - `Neumann`: row `[-1/Δx, 1/Δx]`, constant `g(t, y)`
#[derive(Clone)]
pub enum BoundaryCondition2D {
    /// Prescribed value.
    Dirichlet {
        /// Space coordinate of the boundary
        level: f64,
        /// `(t, y) ↦ V(level, t; y)`
        value: SurfaceBoundaryFn,
    },
    /// Prescribed first derivative.
    Neumann {
        /// Space coordinate of the boundary
        level: f64,
        /// `(t, y) ↦ V_x(level, t; y)`
        gradient: SurfaceBoundaryFn,
    },
}

impl BoundaryCondition2D {
    /// Dirichlet condition at `level`.
    pub fn dirichlet<F>(level: f64, value: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        BoundaryCondition2D::Dirichlet {
            level,
            value: Arc::new(value),
        }
    }

    /// Neumann condition at `level`.
    pub fn neumann<F>(level: f64, gradient: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        BoundaryCondition2D::Neumann {
            level,
            gradient: Arc::new(gradient),
        }
    }

    /// Space coordinate of the boundary.
    pub fn level(&self) -> f64 {
        match self {
            BoundaryCondition2D::Dirichlet { level, .. }
            | BoundaryCondition2D::Neumann { level, .. } => *level,
        }
    }

    /// Row for the first node, scaled by the first interval of `grid`.
    pub fn left_row(&self, _coefficients: &PdeCoefficients, grid: &PdeGrid, _t: f64) -> BoundaryRow {
        self.row(grid.dx_lower())
    }

    /// Row for the last node, scaled by the last interval of `grid`.
    pub fn right_row(&self, _coefficients: &PdeCoefficients, grid: &PdeGrid, _t: f64) -> BoundaryRow {
        self.row(grid.dx_upper())
    }

    /// Right-hand-side constant at `(t, y)`.
    pub fn constant(&self, _coefficients: &PdeCoefficients, t: f64, y: f64) -> f64 {
        match self {
            BoundaryCondition2D::Dirichlet { value, .. } => value(t, y),
            BoundaryCondition2D::Neumann { gradient, .. } => gradient(t, y),
        }
    }

    fn row(&self, dx: f64) -> BoundaryRow {
        match self {
            BoundaryCondition2D::Dirichlet { .. } => BoundaryRow::Single([1.0]),
            BoundaryCondition2D::Neumann { .. } => BoundaryRow::Pair([-1.0 / dx, 1.0 / dx]),
        }
    }

    pub(crate) fn validate_level(&self, expected: f64, edge: &str) -> Result<(), PdeError> {
        let level = self.level();
        let tolerance = 1e-12 * expected.abs().max(1.0);
        if !level.is_finite() || (level - expected).abs() > tolerance {
            return Err(PdeError::configuration(format!(
                "{edge} boundary level {level} does not match mesh edge {expected}"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for BoundaryCondition2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, level) = match self {
            BoundaryCondition2D::Dirichlet { level, .. } => ("Dirichlet2D", level),
            BoundaryCondition2D::Neumann { level, .. } => ("Neumann2D", level),
        };
        f.debug_struct(name).field("level", level).finish_non_exhaustive()
    }
}
