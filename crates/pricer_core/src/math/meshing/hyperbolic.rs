//! Hyperbolic (sinh-stretched) mesh concentrated around an interior point.

use super::{build_pinned, validate_count, validate_domain, Mesh, MeshGenerator};
use crate::types::GridError;

/// Mesh whose spacing is finest around a focus point.
///
/// With `α = concentration * (end - start)` and `u_i = i / (n - 1)`:
///
/// ```text
/// c1  = asinh((start - focus) / α)
/// c2  = asinh((end - focus) / α)
/// x_i = focus + α sinh(c1 (1 - u_i) + c2 u_i)
/// ```
///
/// Near the focus the spacing is roughly `α (c2 - c1) / (n - 1)`; it grows
/// like `|x - focus|` further out. Smaller concentrations give a sharper
/// clustering.
///
/// # Example
///
/// ```
/// use pricer_core::math::meshing::{HyperbolicMesh, MeshGenerator};
///
/// let mesh = HyperbolicMesh::new(0.0, 0.3, 0.03, 151, 0.01)
///     .unwrap()
///     .generate()
///     .unwrap();
///
/// let near = mesh.nodes().partition_point(|&x| x < 0.03);
/// let fine = mesh.node(near) - mesh.node(near - 1);
/// let coarse = mesh.node(150) - mesh.node(149);
/// assert!(coarse > 20.0 * fine);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperbolicMesh {
    start: f64,
    end: f64,
    focus: f64,
    num_points: usize,
    concentration: f64,
}

impl HyperbolicMesh {
    /// Create a hyperbolic mesh generator.
    ///
    /// # Errors
    ///
    /// - `GridError::InvalidDomain` if `start >= end` or either bound is not finite
    /// - `GridError::TooFewPoints` if `num_points < 3`
    /// - `GridError::InvalidConcentration` if `concentration` is not finite and positive
    /// - `GridError::FixedPointOutOfRange` if `focus` is outside `[start, end]`
    pub fn new(
        start: f64,
        end: f64,
        focus: f64,
        num_points: usize,
        concentration: f64,
    ) -> Result<Self, GridError> {
        validate_domain(start, end)?;
        validate_count(num_points)?;
        if !concentration.is_finite() || concentration <= 0.0 {
            return Err(GridError::InvalidConcentration {
                value: concentration,
                reason: "hyperbolic concentration must be finite and positive",
            });
        }
        if !(focus >= start && focus <= end) {
            return Err(GridError::FixedPointOutOfRange {
                point: focus,
                start,
                end,
            });
        }
        Ok(Self {
            start,
            end,
            focus,
            num_points,
            concentration,
        })
    }

    /// Point around which nodes cluster.
    #[inline]
    pub fn focus(&self) -> f64 {
        self.focus
    }
}

impl MeshGenerator for HyperbolicMesh {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn generate(&self) -> Result<Mesh, GridError> {
        let alpha = self.concentration * (self.end - self.start);
        let c1 = ((self.start - self.focus) / alpha).asinh();
        let c2 = ((self.end - self.focus) / alpha).asinh();
        build_pinned(self.start, self.end, self.num_points, |u| {
            self.focus + alpha * (c1 * (1.0 - u) + c2 * u).sinh()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_hyperbolic_concentrates_around_focus() {
        let mesh = HyperbolicMesh::new(0.0, 0.3, 0.03, 151, 0.01)
            .unwrap()
            .generate()
            .unwrap();

        let dx: Vec<f64> = mesh.spacings().collect();
        let (min_index, _) = dx
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        let x_min = mesh.node(min_index);
        assert!((x_min - 0.03).abs() < 0.002, "finest cell at {}", x_min);
    }

    #[test]
    fn test_hyperbolic_symmetric_focus() {
        let mesh = HyperbolicMesh::new(-1.0, 1.0, 0.0, 21, 0.1)
            .unwrap()
            .generate()
            .unwrap();
        assert_relative_eq!(mesh.node(10), 0.0, epsilon = 1e-14);
        for i in 0..21 {
            assert_relative_eq!(mesh.node(i), -mesh.node(20 - i), epsilon = 1e-13);
        }
    }

    #[test]
    fn test_hyperbolic_validation() {
        assert!(matches!(
            HyperbolicMesh::new(0.0, 1.0, 0.5, 10, 0.0),
            Err(GridError::InvalidConcentration { .. })
        ));
        assert!(matches!(
            HyperbolicMesh::new(0.0, 1.0, 1.5, 10, 0.1),
            Err(GridError::FixedPointOutOfRange { .. })
        ));
        assert!(matches!(
            HyperbolicMesh::new(0.0, 1.0, 0.5, 1, 0.1),
            Err(GridError::TooFewPoints { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_hyperbolic_mesh_is_valid(
            start in -5.0..5.0_f64,
            width in 0.01..50.0_f64,
            focus_frac in 0.0..1.0_f64,
            n in 3usize..300,
            beta in 0.005..2.0_f64,
        ) {
            let end = start + width;
            let focus = start + focus_frac * width;
            let mesh = HyperbolicMesh::new(start, end, focus, n, beta)
                .unwrap()
                .generate()
                .unwrap();
            prop_assert_eq!(mesh.len(), n);
            prop_assert_eq!(mesh.start(), start);
            prop_assert_eq!(mesh.end(), end);
            prop_assert!(mesh.nodes().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
