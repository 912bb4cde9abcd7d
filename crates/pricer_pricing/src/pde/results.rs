//! Solution surfaces produced by a solve.

use std::sync::Arc;

use pricer_core::math::grid::{PdeGrid, Stencil};
use pricer_core::math::interpolators::{AxisWeights, InterpolationMethod};
use pricer_core::types::InterpolationError;

use super::config::ResultsStorage;
use super::error::PdeError;

/// Up to three `(index, weight)` pairs along one axis.
#[derive(Debug, Clone, Copy)]
struct Weights {
    entries: [(usize, f64); 3],
    len: usize,
}

impl Weights {
    fn single(index: usize) -> Self {
        Self {
            entries: [(index, 1.0), (0, 0.0), (0, 0.0)],
            len: 1,
        }
    }

    fn from_axis(axis: &AxisWeights) -> Self {
        let mut weights = Self {
            entries: [(0, 0.0); 3],
            len: 0,
        };
        for pair in axis.iter() {
            weights.entries[weights.len] = pair;
            weights.len += 1;
        }
        weights
    }

    fn locate(
        nodes: &[f64],
        x: f64,
        method: InterpolationMethod,
        extrapolate: bool,
    ) -> Result<Self, InterpolationError> {
        if nodes.len() == 1 {
            // A single stored slice is only defined at its own time.
            if !x.is_finite() {
                return Err(InterpolationError::InvalidInput(format!(
                    "query point must be finite, got {x}"
                )));
            }
            if x != nodes[0] && !extrapolate {
                return Err(InterpolationError::OutOfBounds {
                    x,
                    min: nodes[0],
                    max: nodes[0],
                });
            }
            return Ok(Self::single(0));
        }
        let axis = if extrapolate {
            AxisWeights::locate_extrapolating(nodes, x, method)?
        } else {
            AxisWeights::locate(nodes, x, method)?
        };
        Ok(Self::from_axis(&axis))
    }

    fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries[..self.len].iter().copied()
    }
}

/// Immutable solution surface `V(x_i, t_k)` of one solve.
///
/// Values are stored row-major by space node, so `V(x_i, ·)` is contiguous.
/// Time nodes are always in increasing order, whatever the direction of the
/// solve. With [`ResultsStorage::TerminalSlice`] only the last computed
/// slice is kept and the time axis has a single node.
///
/// Interpolation composes one 1D interpolation per axis and is exact at
/// nodes. Queries outside `[x_min, x_max] × [t_min, t_max]` return
/// [`PdeError::Domain`] unless the `*_extrapolating` variant is used.
#[derive(Debug, Clone)]
pub struct ResultsGrid {
    grid: Arc<PdeGrid>,
    time_nodes: Vec<f64>,
    values: Vec<f64>,
    storage: ResultsStorage,
    terminal_index: usize,
    method: InterpolationMethod,
}

impl ResultsGrid {
    /// Assemble from time slices given in increasing time order.
    ///
    /// `terminal_index` marks the slice that was computed last.
    pub(crate) fn from_slices(
        grid: Arc<PdeGrid>,
        time_nodes: Vec<f64>,
        slices: Vec<Vec<f64>>,
        storage: ResultsStorage,
        terminal_index: usize,
        method: InterpolationMethod,
    ) -> Self {
        let nx = grid.num_space_nodes();
        let nt = time_nodes.len();
        let mut values = vec![0.0; nx * nt];
        for (k, slice) in slices.iter().enumerate() {
            for (i, &v) in slice.iter().enumerate() {
                values[i * nt + k] = v;
            }
        }
        Self {
            grid,
            time_nodes,
            values,
            storage,
            terminal_index,
            method,
        }
    }

    /// Copy using another interpolation method.
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    /// Grid the surface was solved on.
    pub fn grid(&self) -> &Arc<PdeGrid> {
        &self.grid
    }

    /// Storage mode of the solve.
    pub fn storage(&self) -> ResultsStorage {
        self.storage
    }

    /// Interpolation method used by queries.
    pub fn interpolation(&self) -> InterpolationMethod {
        self.method
    }

    /// Space coordinates.
    pub fn space_nodes(&self) -> &[f64] {
        self.grid.space_mesh().nodes()
    }

    /// Stored time coordinates, increasing.
    pub fn time_nodes(&self) -> &[f64] {
        &self.time_nodes
    }

    /// Number of space nodes.
    pub fn num_space_nodes(&self) -> usize {
        self.grid.num_space_nodes()
    }

    /// Number of stored time nodes.
    pub fn num_time_nodes(&self) -> usize {
        self.time_nodes.len()
    }

    /// Stored value at space node `i` and stored time node `k`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range; see [`get`](Self::get).
    #[inline]
    pub fn value_at(&self, i: usize, k: usize) -> f64 {
        assert!(k < self.time_nodes.len(), "time index {k} out of range");
        self.values[i * self.time_nodes.len() + k]
    }

    /// Checked variant of [`value_at`](Self::value_at).
    pub fn get(&self, i: usize, k: usize) -> Option<f64> {
        let nt = self.time_nodes.len();
        if i < self.num_space_nodes() && k < nt {
            Some(self.values[i * nt + k])
        } else {
            None
        }
    }

    /// Values at all space nodes for stored time node `k`.
    pub fn slice(&self, k: usize) -> Vec<f64> {
        let nt = self.time_nodes.len();
        (0..self.num_space_nodes())
            .map(|i| self.values[i * nt + k])
            .collect()
    }

    /// The slice computed last: `t_max` for forward solves, `t_min` for
    /// backward ones.
    pub fn terminal_slice(&self) -> Vec<f64> {
        self.slice(self.terminal_index)
    }

    /// Time of the slice computed last.
    pub fn terminal_time(&self) -> f64 {
        self.time_nodes[self.terminal_index]
    }

    /// Values at every stored time for space node `i`.
    fn time_row(&self, i: usize) -> &[f64] {
        let nt = self.time_nodes.len();
        &self.values[i * nt..(i + 1) * nt]
    }

    /// Value at `(x, t)` inside the domain.
    ///
    /// # Errors
    ///
    /// `PdeError::Domain` if `(x, t)` lies outside the stored domain.
    pub fn interpolate(&self, x: f64, t: f64) -> Result<f64, PdeError> {
        self.combine(x, t, false, |i, k| self.value_at(i, k))
    }

    /// Value at `(x, t)`, extending the edge polynomials beyond the domain.
    ///
    /// # Errors
    ///
    /// `PdeError::Domain` only for non-finite coordinates.
    pub fn interpolate_extrapolating(&self, x: f64, t: f64) -> Result<f64, PdeError> {
        self.combine(x, t, true, |i, k| self.value_at(i, k))
    }

    /// `∂V/∂x` at node `(i, k)` from the grid stencil.
    pub fn first_derivative_x(&self, i: usize, k: usize) -> f64 {
        let stencil = self.grid.stencil(i);
        (0..3)
            .map(|j| stencil.first[j] * self.value_at(stencil.offset + j, k))
            .sum()
    }

    /// `∂²V/∂x²` at node `(i, k)` from the grid stencil.
    pub fn second_derivative_x(&self, i: usize, k: usize) -> f64 {
        let stencil = self.grid.stencil(i);
        (0..3)
            .map(|j| stencil.second[j] * self.value_at(stencil.offset + j, k))
            .sum()
    }

    /// `∂V/∂t` at node `(i, k)` from a three-point stencil in time.
    ///
    /// # Errors
    ///
    /// `PdeError::Domain` if fewer than three time slices are stored.
    pub fn derivative_t(&self, i: usize, k: usize) -> Result<f64, PdeError> {
        self.require_time_history()?;
        Ok(Stencil::at(&self.time_nodes, k).apply_first(self.time_row(i)))
    }

    /// Interpolated `∂V/∂x` at `(x, t)`.
    ///
    /// # Errors
    ///
    /// As [`interpolate`](Self::interpolate).
    pub fn first_derivative_x_at(&self, x: f64, t: f64) -> Result<f64, PdeError> {
        self.combine(x, t, false, |i, k| self.first_derivative_x(i, k))
    }

    /// Interpolated `∂²V/∂x²` at `(x, t)`.
    ///
    /// # Errors
    ///
    /// As [`interpolate`](Self::interpolate).
    pub fn second_derivative_x_at(&self, x: f64, t: f64) -> Result<f64, PdeError> {
        self.combine(x, t, false, |i, k| self.second_derivative_x(i, k))
    }

    /// Interpolated `∂V/∂t` at `(x, t)`.
    ///
    /// # Errors
    ///
    /// As [`interpolate`](Self::interpolate), or if fewer than three time
    /// slices are stored.
    pub fn derivative_t_at(&self, x: f64, t: f64) -> Result<f64, PdeError> {
        self.require_time_history()?;
        let stencils: Vec<Stencil> = (0..self.time_nodes.len())
            .map(|k| Stencil::at(&self.time_nodes, k))
            .collect();
        self.combine(x, t, false, |i, k| stencils[k].apply_first(self.time_row(i)))
    }

    /// Node-wise sum of two surfaces solved on the same grid.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` if the space or time nodes differ.
    pub fn try_add(&self, other: &ResultsGrid) -> Result<ResultsGrid, PdeError> {
        let same_grid =
            Arc::ptr_eq(&self.grid, &other.grid) || self.space_nodes() == other.space_nodes();
        if !same_grid || self.time_nodes != other.time_nodes {
            return Err(PdeError::configuration(
                "cannot add results solved on different grids",
            ));
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a + b)
            .collect();
        Ok(ResultsGrid {
            grid: Arc::clone(&self.grid),
            time_nodes: self.time_nodes.clone(),
            values,
            storage: self.storage,
            terminal_index: self.terminal_index,
            method: self.method,
        })
    }

    /// Restrict the surface to `grid`, whose space nodes must be the first
    /// nodes of this surface and whose time mesh must be the same.
    ///
    /// Used to drop far-field nodes added to move a boundary out of the
    /// region of interest.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` if `grid` is not a leading part of this
    /// surface's grid.
    pub fn restrict_to(&self, grid: &Arc<PdeGrid>) -> Result<ResultsGrid, PdeError> {
        let nodes = grid.space_mesh().nodes();
        let n = nodes.len();
        let is_prefix = n <= self.num_space_nodes() && &self.space_nodes()[..n] == nodes;
        if !is_prefix || grid.time_mesh() != self.grid.time_mesh() {
            return Err(PdeError::configuration(
                "restriction grid is not a leading part of the solve grid",
            ));
        }
        let nt = self.time_nodes.len();
        Ok(ResultsGrid {
            grid: Arc::clone(grid),
            time_nodes: self.time_nodes.clone(),
            values: self.values[..n * nt].to_vec(),
            storage: self.storage,
            terminal_index: self.terminal_index,
            method: self.method,
        })
    }

    fn require_time_history(&self) -> Result<(), PdeError> {
        if self.time_nodes.len() < 3 {
            return Err(InterpolationError::InsufficientData {
                got: self.time_nodes.len(),
                need: 3,
            }
            .into());
        }
        Ok(())
    }

    fn combine<F>(&self, x: f64, t: f64, extrapolate: bool, nodal: F) -> Result<f64, PdeError>
    where
        F: Fn(usize, usize) -> f64,
    {
        let wx = Weights::locate(self.space_nodes(), x, self.method, extrapolate)?;
        let wt = Weights::locate(&self.time_nodes, t, self.method, extrapolate)?;
        let mut total = 0.0;
        for (i, a) in wx.iter() {
            for (k, b) in wt.iter() {
                total += a * b * nodal(i, k);
            }
        }
        Ok(total)
    }
}
