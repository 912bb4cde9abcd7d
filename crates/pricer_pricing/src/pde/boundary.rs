//! Boundary conditions for one-dimensional problems.
//!
//! A boundary condition replaces the interior stencil in the first or last
//! row of each time step's linear system. It supplies the row coefficients
//! (acting on the boundary node and, for Neumann, its nearest interior
//! neighbour) and the matching right-hand-side constant.

use std::fmt;
use std::sync::Arc;

use pricer_core::math::grid::PdeGrid;

use super::coefficients::PdeCoefficients;
use super::error::PdeError;

/// Boundary function of time.
pub type BoundaryFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Coefficients of a boundary row, ordered by increasing node index.
///
/// - `Single([1.0])` acts on the boundary node alone
/// - `Pair([c0, c1])` acts on the boundary node and its neighbour; on the
///   left edge these are nodes `(0, 1)`, on the right edge `(n-2, n-1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryRow {
    /// One coefficient on the boundary node.
    Single([f64; 1]),
    /// Two coefficients on the boundary node and its nearest neighbour.
    Pair([f64; 2]),
}

impl BoundaryRow {
    /// Validate a raw coefficient slice.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` unless the slice holds one or two finite
    /// coefficients.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_pricing::pde::BoundaryRow;
    ///
    /// assert_eq!(BoundaryRow::from_slice(&[1.0]).unwrap(), BoundaryRow::Single([1.0]));
    /// assert!(BoundaryRow::from_slice(&[1.0, 2.0, 3.0]).is_err());
    /// ```
    pub fn from_slice(coefficients: &[f64]) -> Result<Self, PdeError> {
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PdeError::configuration(
                "boundary row coefficients must be finite",
            ));
        }
        match *coefficients {
            [c] => Ok(BoundaryRow::Single([c])),
            [c0, c1] => Ok(BoundaryRow::Pair([c0, c1])),
            _ => Err(PdeError::configuration(format!(
                "boundary row must have one or two coefficients, got {}",
                coefficients.len()
            ))),
        }
    }

    /// Coefficients as a slice.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            BoundaryRow::Single(c) => c,
            BoundaryRow::Pair(c) => c,
        }
    }

    /// Number of coefficients.
    pub fn width(&self) -> usize {
        self.as_slice().len()
    }
}

/// Boundary condition at one edge of the space mesh.
///
/// - `Dirichlet`: `V(A, t) = f(t)`; row `[1]`, constant `f(t)`
/// - `Neumann`: `V_x(A, t) = g(t)`; row `[-1, 1]`, constant `g(t) Δx` with
///   `Δx` the width of the boundary interval
///
/// # Example
///
/// ```
/// use pricer_core::math::grid::PdeGrid;
/// use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
/// use pricer_pricing::pde::{BoundaryCondition, BoundaryRow, PdeCoefficients};
///
/// let time = UniformMesh::new(0.0, 1.0, 3).unwrap().generate().unwrap();
/// let space = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
/// let grid = PdeGrid::new(time, space).unwrap();
/// let coefficients = PdeCoefficients::constant(1.0, 0.0, 0.0);
///
/// let upper = BoundaryCondition::neumann(1.0, |_t| 2.0);
/// assert_eq!(upper.right_row(&coefficients, &grid, 0.5), BoundaryRow::Pair([-1.0, 1.0]));
/// assert!((upper.constant(&coefficients, &grid, 0.5) - 0.2).abs() < 1e-12);
/// ```
#[derive(Clone)]
pub enum BoundaryCondition {
    /// Prescribed value.
    Dirichlet {
        /// Space coordinate of the boundary
        level: f64,
        /// `t ↦ V(level, t)`
        value: BoundaryFn,
    },
    /// Prescribed first derivative.
    Neumann {
        /// Space coordinate of the boundary
        level: f64,
        /// `t ↦ V_x(level, t)`
        gradient: BoundaryFn,
    },
}

impl BoundaryCondition {
    /// Dirichlet condition at `level`.
    pub fn dirichlet<F>(level: f64, value: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        BoundaryCondition::Dirichlet {
            level,
            value: Arc::new(value),
        }
    }

    /// Neumann condition at `level`.
    pub fn neumann<F>(level: f64, gradient: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        BoundaryCondition::Neumann {
            level,
            gradient: Arc::new(gradient),
        }
    }

    /// Space coordinate of the boundary.
    pub fn level(&self) -> f64 {
        match self {
            BoundaryCondition::Dirichlet { level, .. } | BoundaryCondition::Neumann { level, .. } => {
                *level
            }
        }
    }

    /// Row for the first node of the system.
    pub fn left_row(&self, _coefficients: &PdeCoefficients, _grid: &PdeGrid, _t: f64) -> BoundaryRow {
        self.row()
    }

    /// Row for the last node of the system.
    pub fn right_row(&self, _coefficients: &PdeCoefficients, _grid: &PdeGrid, _t: f64) -> BoundaryRow {
        self.row()
    }

    /// Right-hand-side constant at time `t`.
    ///
    /// For Neumann the derivative is scaled by the boundary interval on the
    /// edge of `grid` that matches [`level`](Self::level).
    pub fn constant(&self, _coefficients: &PdeCoefficients, grid: &PdeGrid, t: f64) -> f64 {
        match self {
            BoundaryCondition::Dirichlet { value, .. } => value(t),
            BoundaryCondition::Neumann { level, gradient } => {
                let space = grid.space_mesh();
                let dx = if (level - space.start()).abs() <= (level - space.end()).abs() {
                    grid.dx_lower()
                } else {
                    grid.dx_upper()
                };
                gradient(t) * dx
            }
        }
    }

    fn row(&self) -> BoundaryRow {
        match self {
            BoundaryCondition::Dirichlet { .. } => BoundaryRow::Single([1.0]),
            BoundaryCondition::Neumann { .. } => BoundaryRow::Pair([-1.0, 1.0]),
        }
    }

    /// Check that the condition sits on the expected edge of `grid`.
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

impl fmt::Debug for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::Dirichlet { level, .. } => {
                f.debug_struct("Dirichlet").field("level", level).finish_non_exhaustive()
            }
            BoundaryCondition::Neumann { level, .. } => {
                f.debug_struct("Neumann").field("level", level).finish_non_exhaustive()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::math::meshing::{HyperbolicMesh, MeshGenerator, UniformMesh};
    use proptest::prelude::*;

    fn grid() -> PdeGrid {
        let time = UniformMesh::new(0.0, 1.0, 3).unwrap().generate().unwrap();
        let space = HyperbolicMesh::new(0.0, 2.0, 0.5, 21, 0.1)
            .unwrap()
            .generate()
            .unwrap();
        PdeGrid::new(time, space).unwrap()
    }

    #[test]
    fn test_dirichlet_row_and_constant() {
        let grid = grid();
        let coefficients = PdeCoefficients::constant(1.0, 0.0, 0.0);
        let bc = BoundaryCondition::dirichlet(0.0, |t| 3.0 * t);
        assert_eq!(bc.left_row(&coefficients, &grid, 0.2), BoundaryRow::Single([1.0]));
        assert_eq!(bc.constant(&coefficients, &grid, 0.5), 1.5);
        assert_eq!(bc.level(), 0.0);
    }

    #[test]
    fn test_neumann_uses_edge_spacing() {
        let grid = grid();
        let coefficients = PdeCoefficients::constant(1.0, 0.0, 0.0);

        let lower = BoundaryCondition::neumann(0.0, |_| 2.0);
        assert_relative_eq!(
            lower.constant(&coefficients, &grid, 0.0),
            2.0 * grid.dx_lower(),
            epsilon = 1e-15
        );

        let upper = BoundaryCondition::neumann(2.0, |_| 2.0);
        assert_relative_eq!(
            upper.constant(&coefficients, &grid, 0.0),
            2.0 * grid.dx_upper(),
            epsilon = 1e-15
        );
        assert_eq!(upper.right_row(&coefficients, &grid, 0.0), BoundaryRow::Pair([-1.0, 1.0]));
    }

    #[test]
    fn test_level_validation() {
        let bc = BoundaryCondition::dirichlet(0.5, |_| 0.0);
        assert!(bc.validate_level(0.5, "lower").is_ok());
        assert!(bc.validate_level(0.0, "lower").is_err());
    }

    #[test]
    fn test_from_slice_rejects_bad_shapes() {
        assert!(BoundaryRow::from_slice(&[]).is_err());
        assert!(BoundaryRow::from_slice(&[f64::NAN]).is_err());
        assert_eq!(
            BoundaryRow::from_slice(&[-1.0, 1.0]).unwrap(),
            BoundaryRow::Pair([-1.0, 1.0])
        );
    }

    proptest! {
        #[test]
        fn prop_row_width_matches_kind(level in -5.0..5.0_f64, t in 0.0..10.0_f64, neumann in any::<bool>()) {
            let grid = grid();
            let coefficients = PdeCoefficients::constant(1.0, 0.0, 0.0);
            let bc = if neumann {
                BoundaryCondition::neumann(level, |_| 1.0)
            } else {
                BoundaryCondition::dirichlet(level, |_| 1.0)
            };
            let expected = if neumann { 2 } else { 1 };
            prop_assert_eq!(bc.left_row(&coefficients, &grid, t).width(), expected);
            prop_assert_eq!(bc.right_row(&coefficients, &grid, t).width(), expected);
        }

        #[test]
        fn prop_from_slice_accepts_one_or_two(len in 0usize..5) {
            let row = vec![1.0; len];
            prop_assert_eq!(BoundaryRow::from_slice(&row).is_ok(), len == 1 || len == 2);
        }
    }
}
