//! Exponential mesh: node density decays geometrically away from one edge.

use super::{build_pinned, validate_count, validate_domain, Mesh, MeshGenerator};
use crate::types::GridError;

/// Edge of the domain where an [`ExponentialMesh`] places its finest spacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MeshAnchor {
    /// Finest spacing at `start` (e.g. `t = 0` for a forward equation).
    #[default]
    Start,
    /// Finest spacing at `end` (e.g. expiry for a backward equation in calendar time).
    End,
}

/// Exponentially stretched mesh.
///
/// With `u_i = i / (n - 1)` and concentration `λ > 0`, nodes anchored at the
/// start are
///
/// ```text
/// x_i = start + (end - start) * (e^{λ u_i} - 1) / (e^{λ} - 1)
/// ```
///
/// so consecutive spacings grow by a factor `e^{λ / (n - 1)}`. Anchoring at the
/// end mirrors the construction. Larger `λ` packs more nodes near the anchor.
///
/// # Example
///
/// ```
/// use pricer_core::math::meshing::{ExponentialMesh, MeshAnchor, MeshGenerator};
///
/// let mesh = ExponentialMesh::new(0.0, 5.0, 51, 7.5)
///     .unwrap()
///     .anchored_at(MeshAnchor::End)
///     .generate()
///     .unwrap();
///
/// let first = mesh.node(1) - mesh.node(0);
/// let last = mesh.node(50) - mesh.node(49);
/// assert!(last < first);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialMesh {
    start: f64,
    end: f64,
    num_points: usize,
    concentration: f64,
    anchor: MeshAnchor,
}

impl ExponentialMesh {
    /// Create an exponential mesh generator anchored at `start`.
    ///
    /// # Errors
    ///
    /// - `GridError::InvalidDomain` if `start >= end` or either bound is not finite
    /// - `GridError::TooFewPoints` if `num_points < 3`
    /// - `GridError::InvalidConcentration` if `concentration` is not finite and positive
    pub fn new(
        start: f64,
        end: f64,
        num_points: usize,
        concentration: f64,
    ) -> Result<Self, GridError> {
        validate_domain(start, end)?;
        validate_count(num_points)?;
        if !concentration.is_finite() || concentration <= 0.0 {
            return Err(GridError::InvalidConcentration {
                value: concentration,
                reason: "exponential concentration must be finite and positive",
            });
        }
        Ok(Self {
            start,
            end,
            num_points,
            concentration,
            anchor: MeshAnchor::Start,
        })
    }

    /// Place the finest spacing at the given edge.
    #[inline]
    pub fn anchored_at(mut self, anchor: MeshAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Edge with the finest spacing.
    #[inline]
    pub fn anchor(&self) -> MeshAnchor {
        self.anchor
    }

    /// `(e^{λu} - 1) / (e^{λ} - 1)`, evaluated without overflow for large `λ`.
    fn stretch(&self, u: f64) -> f64 {
        let lambda = self.concentration;
        (lambda * (u - 1.0)).exp() * (-(-lambda * u).exp_m1()) / (-(-lambda).exp_m1())
    }
}

impl MeshGenerator for ExponentialMesh {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn generate(&self) -> Result<Mesh, GridError> {
        let width = self.end - self.start;
        match self.anchor {
            MeshAnchor::Start => build_pinned(self.start, self.end, self.num_points, |u| {
                self.start + width * self.stretch(u)
            }),
            MeshAnchor::End => build_pinned(self.start, self.end, self.num_points, |u| {
                self.end - width * self.stretch(1.0 - u)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_exponential_spacing_ratio() {
        let n = 11;
        let lambda = 2.0;
        let mesh = ExponentialMesh::new(0.0, 1.0, n, lambda)
            .unwrap()
            .generate()
            .unwrap();
        let dx: Vec<f64> = mesh.spacings().collect();
        let ratio = (lambda / (n - 1) as f64).exp();
        for w in dx.windows(2) {
            assert_relative_eq!(w[1] / w[0], ratio, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_exponential_matches_closed_form() {
        let mesh = ExponentialMesh::new(0.0, 5.0, 51, 7.5)
            .unwrap()
            .generate()
            .unwrap();
        let expected = 5.0 * ((7.5_f64 * 0.5).exp() - 1.0) / (7.5_f64.exp() - 1.0);
        assert_relative_eq!(mesh.node(25), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_exponential_end_anchor_mirrors_start() {
        let start = ExponentialMesh::new(0.0, 2.0, 9, 3.0)
            .unwrap()
            .generate()
            .unwrap();
        let end = ExponentialMesh::new(0.0, 2.0, 9, 3.0)
            .unwrap()
            .anchored_at(MeshAnchor::End)
            .generate()
            .unwrap();
        for i in 0..9 {
            assert_relative_eq!(end.node(i), 2.0 - start.node(8 - i), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_exponential_large_concentration_is_finite() {
        let mesh = ExponentialMesh::new(0.0, 1.0, 5, 1000.0).unwrap().generate();
        // Every interior node collapses onto the anchor: rejected, not NaN.
        assert!(matches!(mesh, Err(GridError::NonMonotonic { .. })));
    }

    #[test]
    fn test_exponential_rejects_non_positive_concentration() {
        assert!(matches!(
            ExponentialMesh::new(0.0, 1.0, 10, 0.0),
            Err(GridError::InvalidConcentration { .. })
        ));
        assert!(matches!(
            ExponentialMesh::new(0.0, 1.0, 10, -1.0),
            Err(GridError::InvalidConcentration { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_exponential_mesh_is_valid(
            start in -5.0..5.0_f64,
            width in 0.01..50.0_f64,
            n in 3usize..300,
            lambda in 0.01..20.0_f64,
            at_end in any::<bool>(),
        ) {
            let anchor = if at_end { MeshAnchor::End } else { MeshAnchor::Start };
            let end = start + width;
            let mesh = ExponentialMesh::new(start, end, n, lambda)
                .unwrap()
                .anchored_at(anchor)
                .generate()
                .unwrap();
            prop_assert_eq!(mesh.len(), n);
            prop_assert_eq!(mesh.start(), start);
            prop_assert_eq!(mesh.end(), end);
            prop_assert!(mesh.nodes().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
