//! One-dimensional mesh generation.
//!
//! A [`Mesh`] is an immutable, strictly increasing sequence of at least three
//! nodes whose first and last values are exactly the configured domain
//! bounds. Meshes are produced by a [`MeshGenerator`]:
//!
//! - [`UniformMesh`]: equally spaced nodes
//! - [`ExponentialMesh`]: spacing grows geometrically away from one edge
//! - [`HyperbolicMesh`]: spacing is finest around an interior focus point
//!
//! Generators validate their parameters on construction; `generate` still
//! rejects node sets that collapse below floating-point resolution.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::meshing::{ExponentialMesh, HyperbolicMesh, MeshGenerator};
//!
//! // Time mesh concentrated near t = 0
//! let time = ExponentialMesh::new(0.0, 5.0, 51, 7.5).unwrap().generate().unwrap();
//! assert_eq!(time.len(), 51);
//! assert_eq!(time.start(), 0.0);
//! assert_eq!(time.end(), 5.0);
//!
//! // Space mesh concentrated around the spot
//! let space = HyperbolicMesh::new(0.0, 0.3, 0.03, 151, 0.01)
//!     .unwrap()
//!     .generate()
//!     .unwrap();
//! assert!(space.nodes().windows(2).all(|w| w[0] < w[1]));
//! ```

mod exponential;
mod hyperbolic;
mod uniform;

pub use exponential::{ExponentialMesh, MeshAnchor};
pub use hyperbolic::HyperbolicMesh;
pub use uniform::UniformMesh;

use crate::types::GridError;

/// Minimum number of nodes in any mesh.
pub const MIN_MESH_POINTS: usize = 3;

/// Smallest gap between fixed nodes, as a fraction of the cell a new fixed
/// point falls into.
const MIN_FIXED_POINT_SEPARATION: f64 = 0.5;

/// Produces a [`Mesh`] from a fixed set of parameters.
///
/// Implementations are pure: calling `generate` twice yields identical meshes.
pub trait MeshGenerator {
    /// Number of nodes the generated mesh will contain.
    fn num_points(&self) -> usize;

    /// Build the mesh.
    ///
    /// # Errors
    ///
    /// Returns `GridError` if the computed nodes are not finite or not
    /// strictly increasing (only possible for degenerate parameters such as
    /// a domain narrower than floating-point resolution).
    fn generate(&self) -> Result<Mesh, GridError>;
}

/// Immutable, strictly increasing sequence of mesh nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mesh {
    nodes: Vec<f64>,
}

impl Mesh {
    /// Construct a mesh from explicit nodes.
    ///
    /// # Errors
    ///
    /// - `GridError::TooFewPoints` if fewer than three nodes
    /// - `GridError::NonFinite` if any node is NaN or infinite
    /// - `GridError::NonMonotonic` if nodes are not strictly increasing
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::meshing::Mesh;
    ///
    /// assert!(Mesh::from_nodes(vec![0.0, 0.5, 2.0]).is_ok());
    /// assert!(Mesh::from_nodes(vec![0.0, 0.5, 0.5]).is_err());
    /// ```
    pub fn from_nodes(nodes: Vec<f64>) -> Result<Self, GridError> {
        if nodes.len() < MIN_MESH_POINTS {
            return Err(GridError::TooFewPoints {
                got: nodes.len(),
                need: MIN_MESH_POINTS,
            });
        }
        if let Some(index) = nodes.iter().position(|x| !x.is_finite()) {
            return Err(GridError::NonFinite { index });
        }
        if let Some(index) = nodes.windows(2).position(|w| w[1] <= w[0]) {
            return Err(GridError::NonMonotonic { index: index + 1 });
        }
        Ok(Self { nodes })
    }

    /// All nodes in increasing order.
    #[inline]
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn node(&self, index: usize) -> f64 {
        self.nodes[index]
    }

    /// Number of nodes (always at least three).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node.
    #[inline]
    pub fn start(&self) -> f64 {
        self.nodes[0]
    }

    /// Last node.
    #[inline]
    pub fn end(&self) -> f64 {
        self.nodes[self.nodes.len() - 1]
    }

    /// Whether `x` lies in the closed interval spanned by the mesh.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start() && x <= self.end()
    }

    /// Index of the node exactly equal to `x`, if any.
    pub fn position_of(&self, x: f64) -> Option<usize> {
        self.nodes
            .binary_search_by(|probe| probe.total_cmp(&x))
            .ok()
    }

    /// Spacings `x[i+1] - x[i]`, one per interval.
    pub fn spacings(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.windows(2).map(|w| w[1] - w[0])
    }

    /// Return a copy of the mesh with each fixed point moved onto the
    /// nearest free interior node.
    ///
    /// Endpoints are never moved. Use this to guarantee that the spot level
    /// or a strike coincides with a node.
    ///
    /// # Errors
    ///
    /// - `GridError::FixedPointOutOfRange` if a point is not strictly inside the domain
    /// - `GridError::TooFewPoints` if there are more fixed points than interior nodes
    /// - `GridError::FixedPointsTooClose` if a point lies within half the
    ///   local spacing of an endpoint or an earlier fixed point, or has no
    ///   free node left to move
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
    ///
    /// let mesh = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
    /// let pinned = mesh.with_fixed_points(&[0.33]).unwrap();
    /// assert!(pinned.position_of(0.33).is_some());
    /// ```
    pub fn with_fixed_points(&self, points: &[f64]) -> Result<Self, GridError> {
        let (start, end) = (self.start(), self.end());
        let n = self.nodes.len();
        if points.len() > n - 2 {
            return Err(GridError::TooFewPoints {
                got: n,
                need: points.len() + 2,
            });
        }

        let mut nodes = self.nodes.clone();
        let mut pinned = vec![false; n];
        pinned[0] = true;
        pinned[n - 1] = true;

        for &point in points {
            if !(point > start && point < end) {
                return Err(GridError::FixedPointOutOfRange { point, start, end });
            }
            if let Some(existing) = nodes.iter().position(|&x| x == point) {
                pinned[existing] = true;
                continue;
            }
            let upper = nodes.partition_point(|&x| x < point);
            let lower = upper - 1;
            let nearest = if point - nodes[lower] <= nodes[upper] - point {
                [lower, upper]
            } else {
                [upper, lower]
            };
            let too_close = GridError::FixedPointsTooClose {
                first: nodes[nearest[0]],
                second: point,
            };
            let min_gap = MIN_FIXED_POINT_SEPARATION * (nodes[upper] - nodes[lower]);
            if pinned[nearest[0]] && (nodes[nearest[0]] - point).abs() < min_gap {
                return Err(too_close);
            }
            let slot = nearest
                .into_iter()
                .find(|&i| !pinned[i])
                .ok_or(too_close)?;
            nodes[slot] = point;
            pinned[slot] = true;
        }

        Self::from_nodes(nodes)
    }
}

impl AsRef<[f64]> for Mesh {
    fn as_ref(&self) -> &[f64] {
        &self.nodes
    }
}

pub(crate) fn validate_domain(start: f64, end: f64) -> Result<(), GridError> {
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(GridError::InvalidDomain { start, end });
    }
    Ok(())
}

pub(crate) fn validate_count(num_points: usize) -> Result<(), GridError> {
    if num_points < MIN_MESH_POINTS {
        return Err(GridError::TooFewPoints {
            got: num_points,
            need: MIN_MESH_POINTS,
        });
    }
    Ok(())
}

/// Map the unit-interval positions `u_i = i / (n - 1)` through `f`, then pin
/// both ends to the exact domain bounds.
pub(crate) fn build_pinned<F>(start: f64, end: f64, num_points: usize, f: F) -> Result<Mesh, GridError>
where
    F: Fn(f64) -> f64,
{
    let last = num_points - 1;
    let mut nodes: Vec<f64> = (0..num_points)
        .map(|i| f(i as f64 / last as f64))
        .collect();
    nodes[0] = start;
    nodes[last] = end;
    Mesh::from_nodes(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_from_nodes_rejects_short_mesh() {
        assert_eq!(
            Mesh::from_nodes(vec![0.0, 1.0]),
            Err(GridError::TooFewPoints { got: 2, need: 3 })
        );
    }

    #[test]
    fn test_from_nodes_rejects_non_monotonic() {
        assert_eq!(
            Mesh::from_nodes(vec![0.0, 2.0, 1.0, 3.0]),
            Err(GridError::NonMonotonic { index: 2 })
        );
    }

    #[test]
    fn test_from_nodes_rejects_nan() {
        assert_eq!(
            Mesh::from_nodes(vec![0.0, f64::NAN, 1.0]),
            Err(GridError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn test_position_of() {
        let mesh = Mesh::from_nodes(vec![0.0, 0.25, 1.0, 4.0]).unwrap();
        assert_eq!(mesh.position_of(1.0), Some(2));
        assert_eq!(mesh.position_of(0.3), None);
        assert!(mesh.contains(4.0));
        assert!(!mesh.contains(4.0001));
    }

    #[test]
    fn test_fixed_points_snap_to_nearest_node() {
        let mesh = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
        let pinned = mesh.with_fixed_points(&[0.31, 0.69]).unwrap();

        assert_eq!(pinned.node(3), 0.31);
        assert_eq!(pinned.node(7), 0.69);
        assert_eq!(pinned.len(), 11);
        assert_eq!(pinned.start(), 0.0);
        assert_eq!(pinned.end(), 1.0);
    }

    #[test]
    fn test_fixed_points_in_one_cell_are_rejected() {
        let mesh = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
        assert_eq!(
            mesh.with_fixed_points(&[0.31, 0.32]),
            Err(GridError::FixedPointsTooClose {
                first: 0.31,
                second: 0.32
            })
        );
        assert_eq!(
            mesh.with_fixed_points(&[0.305, 0.31]),
            Err(GridError::FixedPointsTooClose {
                first: 0.305,
                second: 0.31
            })
        );
        assert_eq!(
            mesh.with_fixed_points(&[0.01]),
            Err(GridError::FixedPointsTooClose {
                first: 0.0,
                second: 0.01
            })
        );
    }

    #[test]
    fn test_fixed_points_keep_cells_reasonable() {
        // 0.35 sits between the pinned 0.29 and the free node at 0.4.
        let mesh = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
        let pinned = mesh.with_fixed_points(&[0.29, 0.35]).unwrap();
        assert_eq!(pinned.node(3), 0.29);
        assert_eq!(pinned.node(4), 0.35);
        let min_cell = pinned.spacings().fold(f64::INFINITY, f64::min);
        assert!(min_cell >= 0.05, "smallest cell {min_cell}");
    }

    #[test]
    fn test_fixed_point_outside_domain() {
        let mesh = UniformMesh::new(0.0, 1.0, 5).unwrap().generate().unwrap();
        assert!(matches!(
            mesh.with_fixed_points(&[1.0]),
            Err(GridError::FixedPointOutOfRange { .. })
        ));
        assert!(matches!(
            mesh.with_fixed_points(&[-0.1]),
            Err(GridError::FixedPointOutOfRange { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_spacings_telescope(
            start in -10.0..10.0_f64,
            width in 0.1..100.0_f64,
            n in 3usize..400,
        ) {
            let mesh = UniformMesh::new(start, start + width, n).unwrap().generate().unwrap();
            let total: f64 = mesh.spacings().sum();
            assert_relative_eq!(total, mesh.end() - mesh.start(), epsilon = 1e-9);
        }
    }
}
