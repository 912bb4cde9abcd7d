//! Uniform mesh.

use super::{build_pinned, validate_count, validate_domain, Mesh, MeshGenerator};
use crate::types::GridError;

/// Equally spaced nodes over `[start, end]`.
///
/// # Example
///
/// ```
/// use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
///
/// let mesh = UniformMesh::new(0.0, 1.0, 5).unwrap().generate().unwrap();
/// assert_eq!(mesh.nodes(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformMesh {
    start: f64,
    end: f64,
    num_points: usize,
}

impl UniformMesh {
    /// Create a uniform mesh generator.
    ///
    /// # Errors
    ///
    /// - `GridError::InvalidDomain` if `start >= end` or either bound is not finite
    /// - `GridError::TooFewPoints` if `num_points < 3`
    pub fn new(start: f64, end: f64, num_points: usize) -> Result<Self, GridError> {
        validate_domain(start, end)?;
        validate_count(num_points)?;
        Ok(Self {
            start,
            end,
            num_points,
        })
    }
}

impl MeshGenerator for UniformMesh {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn generate(&self) -> Result<Mesh, GridError> {
        let width = self.end - self.start;
        build_pinned(self.start, self.end, self.num_points, |u| {
            self.start + width * u
        })
    }
}
