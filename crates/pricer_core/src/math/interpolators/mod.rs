//! Interpolation on strictly increasing node sets.
//!
//! ## Available Interpolators
//!
//! - [`LinearInterpolator`]: Piecewise linear interpolation between data points
//! - [`AxisWeights`]: Interpolation weights along one grid axis, either
//!   linear or local quadratic; two of these compose into a 2D interpolation
//!   over a tensor-product grid
//!
//! ## Core Trait
//!
//! 1D interpolators implement the [`Interpolator`] trait, which defines:
//! - `interpolate(x: T) -> Result<T, InterpolationError>`: Compute interpolated value
//! - `domain() -> (T, T)`: Return valid interpolation range
//!
//! ## Domain Policy
//!
//! Queries outside the node range are rejected with
//! `InterpolationError::OutOfBounds`. Extrapolation happens only through the
//! explicitly named `*_extrapolating` entry points.
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
//!
//! let xs = [0.0_f64, 1.0, 2.0, 3.0];
//! let ys = [0.0, 1.0, 4.0, 9.0];
//!
//! let interp = LinearInterpolator::new(&xs, &ys).unwrap();
//! assert_eq!(interp.domain(), (0.0, 3.0));
//!
//! let y = interp.interpolate(1.5).unwrap();
//! assert!((y - 2.5).abs() < 1e-10);
//! assert!(interp.interpolate(3.5).is_err());
//! ```

mod axis;
mod linear;
mod traits;

pub use axis::{AxisWeights, InterpolationMethod};
pub use linear::LinearInterpolator;
pub use traits::Interpolator;

/// Index `i` of the segment `[xs[i], xs[i+1]]` used for `x`, clamped to
/// `[0, n-2]` so that points beyond either end map to the edge segment.
#[inline]
pub(crate) fn find_segment<T: PartialOrd + Copy>(xs: &[T], x: T) -> usize {
    let pos = xs.partition_point(|&xi| xi <= x);
    pos.clamp(1, xs.len() - 1) - 1
}

/// Check that `xs` has at least `need` entries and is strictly increasing.
pub(crate) fn validate_nodes<T: num_traits::Float>(
    xs: &[T],
    need: usize,
) -> Result<(), crate::types::InterpolationError> {
    use crate::types::InterpolationError;

    if xs.len() < need {
        return Err(InterpolationError::InsufficientData {
            got: xs.len(),
            need,
        });
    }
    if let Some(i) = xs.windows(2).position(|w| w[1].partial_cmp(&w[0]) != Some(std::cmp::Ordering::Greater)) {
        return Err(InterpolationError::NonMonotonicData { index: i + 1 });
    }
    Ok(())
}
