//! Errors raised by discount curves.

use crate::types::InterpolationError;
use num_traits::Float;
use thiserror::Error;

/// Discount curve errors.
///
/// Times are reported as `f64` whatever the curve's float type, so the
/// error stays `'static` and serialisable.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::{FlatCurve, MarketDataError, YieldCurve};
///
/// let curve = FlatCurve::new(0.02_f64);
/// assert_eq!(
///     curve.discount_factor(-1.0),
///     Err(MarketDataError::InvalidMaturity { t: -1.0 })
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarketDataError {
    /// A maturity before the valuation date (or at it, where a rate is
    /// requested).
    #[error("Maturity {t} is not admissible")]
    InvalidMaturity {
        /// Offending time in years
        t: f64,
    },

    /// A forward interval with `end <= start`.
    #[error("Empty forward interval [{start}, {end}]")]
    InvalidInterval {
        /// Interval start
        start: f64,
        /// Interval end
        end: f64,
    },

    /// A query outside the pillars of a curve that does not extrapolate.
    #[error("Time {t} beyond curve pillars [{first}, {last}]")]
    BeyondPillars {
        /// Requested time
        t: f64,
        /// First pillar
        first: f64,
        /// Last pillar
        last: f64,
    },

    /// Pillar interpolation failed.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Too few pillars, or tenors and rates of different lengths.
    #[error("Insufficient pillars: got {got}, need {need}")]
    InsufficientData {
        /// Number supplied
        got: usize,
        /// Number required
        need: usize,
    },
}

#[inline]
pub(crate) fn as_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// `Ok(())` when `t >= 0`.
pub(crate) fn require_maturity<T: Float>(t: T) -> Result<(), MarketDataError> {
    if t >= T::zero() {
        Ok(())
    } else {
        Err(MarketDataError::InvalidMaturity { t: as_f64(t) })
    }
}

/// `Ok(())` when `t > 0`; zero rates are undefined at the valuation date.
pub(crate) fn require_positive_maturity<T: Float>(t: T) -> Result<(), MarketDataError> {
    if t > T::zero() {
        Ok(())
    } else {
        Err(MarketDataError::InvalidMaturity { t: as_f64(t) })
    }
}

/// `Ok(())` when `0 <= start < end`.
pub(crate) fn require_interval<T: Float>(start: T, end: T) -> Result<(), MarketDataError> {
    require_maturity(start)?;
    if end > start {
        Ok(())
    } else {
        Err(MarketDataError::InvalidInterval {
            start: as_f64(start),
            end: as_f64(end),
        })
    }
}
