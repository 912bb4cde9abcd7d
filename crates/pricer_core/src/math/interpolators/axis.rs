//! Interpolation weights along a single grid axis.

use super::{find_segment, validate_nodes};
use crate::types::InterpolationError;

/// Polynomial order used between grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InterpolationMethod {
    /// Two-point linear interpolation.
    Linear,
    /// Three-point Lagrange interpolation on the nodes nearest the query.
    #[default]
    Quadratic,
}

/// Weights expressing the value at one coordinate as a combination of
/// at most three consecutive nodal values.
///
/// A query that coincides with a node yields a single unit weight, so
/// interpolation is exact at nodes. Composing two `AxisWeights` (one per
/// axis) gives tensor-product 2D interpolation.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::{AxisWeights, InterpolationMethod};
///
/// let nodes = [0.0, 1.0, 2.0, 4.0];
/// let values = [0.0, 1.0, 4.0, 16.0];
///
/// let w = AxisWeights::locate(&nodes, 3.0, InterpolationMethod::Quadratic).unwrap();
/// assert!((w.apply(&values) - 9.0).abs() < 1e-12);
///
/// let w = AxisWeights::locate(&nodes, 2.0, InterpolationMethod::Linear).unwrap();
/// assert_eq!(w.apply(&values), 4.0);
///
/// assert!(AxisWeights::locate(&nodes, 4.5, InterpolationMethod::Linear).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWeights {
    offset: usize,
    weights: [f64; 3],
    width: usize,
}

impl AxisWeights {
    /// Weights for `x` inside `[nodes[0], nodes[n-1]]`.
    ///
    /// # Errors
    ///
    /// - `InterpolationError::OutOfBounds` if `x` lies outside the nodes
    /// - `InterpolationError::InvalidInput` if `x` is not finite
    /// - `InterpolationError::InsufficientData` or `NonMonotonicData` for bad nodes
    pub fn locate(
        nodes: &[f64],
        x: f64,
        method: InterpolationMethod,
    ) -> Result<Self, InterpolationError> {
        Self::locate_inner(nodes, x, method, false)
    }

    /// Weights for any finite `x`; beyond the nodes the edge polynomial is
    /// extended.
    ///
    /// # Errors
    ///
    /// As [`locate`](Self::locate), minus `OutOfBounds`.
    pub fn locate_extrapolating(
        nodes: &[f64],
        x: f64,
        method: InterpolationMethod,
    ) -> Result<Self, InterpolationError> {
        Self::locate_inner(nodes, x, method, true)
    }

    fn locate_inner(
        nodes: &[f64],
        x: f64,
        method: InterpolationMethod,
        extrapolate: bool,
    ) -> Result<Self, InterpolationError> {
        validate_nodes(nodes, 2)?;
        if !x.is_finite() {
            return Err(InterpolationError::InvalidInput(format!(
                "query point must be finite, got {x}"
            )));
        }
        let (lo, hi) = (nodes[0], nodes[nodes.len() - 1]);
        if !extrapolate && (x < lo || x > hi) {
            return Err(InterpolationError::OutOfBounds { x, min: lo, max: hi });
        }

        if let Ok(index) = nodes.binary_search_by(|probe| probe.total_cmp(&x)) {
            return Ok(Self {
                offset: index,
                weights: [1.0, 0.0, 0.0],
                width: 1,
            });
        }

        let segment = find_segment(nodes, x);
        if method == InterpolationMethod::Linear || nodes.len() < 3 {
            let (x0, x1) = (nodes[segment], nodes[segment + 1]);
            let t = (x - x0) / (x1 - x0);
            return Ok(Self {
                offset: segment,
                weights: [1.0 - t, t, 0.0],
                width: 2,
            });
        }

        // Third node on the side nearer to x, clamped at the edges.
        let offset = if segment == 0 {
            0
        } else if segment + 2 >= nodes.len() {
            nodes.len() - 3
        } else if x - nodes[segment] < nodes[segment + 1] - x {
            segment - 1
        } else {
            segment
        };
        let p = [nodes[offset], nodes[offset + 1], nodes[offset + 2]];
        let mut weights = [0.0; 3];
        for j in 0..3 {
            let k = (j + 1) % 3;
            let m = (j + 2) % 3;
            weights[j] = (x - p[k]) * (x - p[m]) / ((p[j] - p[k]) * (p[j] - p[m]));
        }
        Ok(Self {
            offset,
            weights,
            width: 3,
        })
    }

    /// Index of the first node carrying weight.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `(node index, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.weights[..self.width]
            .iter()
            .enumerate()
            .map(move |(j, &w)| (self.offset + j, w))
    }

    /// Weighted sum of `values`, which must be indexed like the nodes.
    pub fn apply(&self, values: &[f64]) -> f64 {
        self.iter().map(|(i, w)| w * values[i]).sum()
    }

    /// Whether the query coincided with a node.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.width == 1
    }
}
