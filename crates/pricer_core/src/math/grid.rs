//! Two-dimensional time/space grid for finite-difference schemes.

use super::meshing::Mesh;
use crate::types::GridError;

/// Three-point finite-difference stencil anchored at one node.
///
/// `first[j]` and `second[j]` weight the value at node `offset + j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    /// Index of the first of the three nodes.
    pub offset: usize,
    /// First-derivative weights.
    pub first: [f64; 3],
    /// Second-derivative weights.
    pub second: [f64; 3],
}

impl Stencil {
    /// Stencil at node `i` of `nodes` (at least three strictly increasing
    /// values): central for interior nodes, one-sided at either end.
    ///
    /// # Panics
    ///
    /// Panics if `nodes.len() < 3` or `i >= nodes.len()`.
    pub fn at(nodes: &[f64], i: usize) -> Self {
        let offset = i.saturating_sub(1).min(nodes.len() - 3);
        Self::through(
            offset,
            [nodes[offset], nodes[offset + 1], nodes[offset + 2]],
            nodes[i],
        )
    }

    /// Differentiate the quadratic through `(x0, x1, x2)` at `at`.
    fn through(offset: usize, x: [f64; 3], at: f64) -> Self {
        let mut first = [0.0; 3];
        let mut second = [0.0; 3];
        for j in 0..3 {
            let k = (j + 1) % 3;
            let m = (j + 2) % 3;
            let denom = (x[j] - x[k]) * (x[j] - x[m]);
            first[j] = ((at - x[k]) + (at - x[m])) / denom;
            second[j] = 2.0 / denom;
        }
        Self {
            offset,
            first,
            second,
        }
    }

    /// Apply the first-derivative weights to `values`.
    #[inline]
    pub fn apply_first(&self, values: &[f64]) -> f64 {
        let v = &values[self.offset..self.offset + 3];
        self.first[0] * v[0] + self.first[1] * v[1] + self.first[2] * v[2]
    }

    /// Apply the second-derivative weights to `values`.
    #[inline]
    pub fn apply_second(&self, values: &[f64]) -> f64 {
        let v = &values[self.offset..self.offset + 3];
        self.second[0] * v[0] + self.second[1] * v[1] + self.second[2] * v[2]
    }
}

/// Cartesian product of a time mesh and a space mesh.
///
/// All spacing-dependent quantities are computed once in [`PdeGrid::new`]:
/// interval widths along both axes and, for every space node, the
/// three-point derivative stencil. Interior nodes use the standard central
/// non-uniform weights
///
/// ```text
/// V'  ≈ -h+/(h-(h-+h+)) V[i-1] + (h+-h-)/(h-h+) V[i] + h-/(h+(h-+h+)) V[i+1]
/// V'' ≈  2/(h-(h-+h+))  V[i-1] - 2/(h-h+)      V[i] + 2/(h+(h-+h+))  V[i+1]
/// ```
///
/// with `h- = x[i] - x[i-1]` and `h+ = x[i+1] - x[i]`. Boundary nodes use
/// one-sided three-point stencils.
///
/// A `PdeGrid` is immutable and `Send + Sync`; share it between concurrent
/// solves behind an `Arc`.
///
/// # Example
///
/// ```
/// use pricer_core::math::grid::PdeGrid;
/// use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
///
/// let time = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
/// let space = UniformMesh::new(0.0, 2.0, 21).unwrap().generate().unwrap();
/// let grid = PdeGrid::new(time, space).unwrap();
///
/// assert_eq!(grid.num_time_nodes(), 11);
/// assert_eq!(grid.num_space_nodes(), 21);
/// assert!((grid.dx_minus(5) - 0.1).abs() < 1e-14);
/// ```
#[derive(Debug, Clone)]
pub struct PdeGrid {
    time: Mesh,
    space: Mesh,
    time_steps: Vec<f64>,
    space_steps: Vec<f64>,
    stencils: Vec<Stencil>,
}

impl PdeGrid {
    /// Build a grid and precompute its spacing and stencil tables.
    ///
    /// # Errors
    ///
    /// Returns `GridError::TooFewPoints` if either mesh has fewer than three nodes.
    pub fn new(time: Mesh, space: Mesh) -> Result<Self, GridError> {
        for mesh in [&time, &space] {
            if mesh.len() < 3 {
                return Err(GridError::TooFewPoints {
                    got: mesh.len(),
                    need: 3,
                });
            }
        }

        let time_steps: Vec<f64> = time.spacings().collect();
        let space_steps: Vec<f64> = space.spacings().collect();

        let x = space.nodes();
        let stencils = (0..x.len()).map(|i| Stencil::at(x, i)).collect();

        Ok(Self {
            time,
            space,
            time_steps,
            space_steps,
            stencils,
        })
    }

    /// Time mesh.
    #[inline]
    pub fn time_mesh(&self) -> &Mesh {
        &self.time
    }

    /// Space mesh.
    #[inline]
    pub fn space_mesh(&self) -> &Mesh {
        &self.space
    }

    /// Number of time nodes.
    #[inline]
    pub fn num_time_nodes(&self) -> usize {
        self.time.len()
    }

    /// Number of space nodes.
    #[inline]
    pub fn num_space_nodes(&self) -> usize {
        self.space.len()
    }

    /// Time coordinate of node `k`.
    #[inline]
    pub fn time_node(&self, k: usize) -> f64 {
        self.time.node(k)
    }

    /// Space coordinate of node `i`.
    #[inline]
    pub fn space_node(&self, i: usize) -> f64 {
        self.space.node(i)
    }

    /// `t[k + 1] - t[k]`.
    #[inline]
    pub fn time_step(&self, k: usize) -> f64 {
        self.time_steps[k]
    }

    /// `x[i] - x[i - 1]` for `i >= 1`.
    #[inline]
    pub fn dx_minus(&self, i: usize) -> f64 {
        self.space_steps[i - 1]
    }

    /// `x[i + 1] - x[i]` for `i < n - 1`.
    #[inline]
    pub fn dx_plus(&self, i: usize) -> f64 {
        self.space_steps[i]
    }

    /// Width of the first space interval.
    #[inline]
    pub fn dx_lower(&self) -> f64 {
        self.space_steps[0]
    }

    /// Width of the last space interval.
    #[inline]
    pub fn dx_upper(&self) -> f64 {
        self.space_steps[self.space_steps.len() - 1]
    }

    /// Derivative stencil at space node `i`.
    #[inline]
    pub fn stencil(&self, i: usize) -> &Stencil {
        &self.stencils[i]
    }

    /// Sum of all space intervals; equals `x_max - x_min` up to rounding.
    pub fn space_spacing_sum(&self) -> f64 {
        self.space_steps.iter().sum()
    }

    /// First derivative of nodal `values` at space node `i`.
    #[inline]
    pub fn first_derivative(&self, values: &[f64], i: usize) -> f64 {
        self.stencils[i].apply_first(values)
    }

    /// Second derivative of nodal `values` at space node `i`.
    #[inline]
    pub fn second_derivative(&self, values: &[f64], i: usize) -> f64 {
        self.stencils[i].apply_second(values)
    }
}
