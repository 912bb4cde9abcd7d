//! Core interpolation trait.

use crate::types::InterpolationError;
use num_traits::Float;

/// One-dimensional interpolator over a fixed set of nodes.
///
/// Implementations must be exact at their nodes and must reject queries
/// outside [`domain`](Interpolator::domain) with
/// `InterpolationError::OutOfBounds`.
pub trait Interpolator<T: Float> {
    /// Interpolated value at `x`.
    ///
    /// # Errors
    ///
    /// Returns `InterpolationError::OutOfBounds` if `x` is outside the domain.
    fn interpolate(&self, x: T) -> Result<T, InterpolationError>;

    /// Closed interval `(x_min, x_max)` covered by the nodes.
    fn domain(&self) -> (T, T);

    /// Whether `x` lies inside the domain.
    fn contains(&self, x: T) -> bool {
        let (lo, hi) = self.domain();
        x >= lo && x <= hi
    }
}
