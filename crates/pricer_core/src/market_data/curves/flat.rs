//! Constant-rate curve.

use super::YieldCurve;
use crate::market_data::error::{
    require_interval, require_maturity, require_positive_maturity, MarketDataError,
};
use num_traits::Float;

/// Curve with one continuously compounded rate for every maturity.
///
/// Every rate query returns that rate, so the short rate seen by a PDE is
/// exact rather than a finite-difference estimate.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{YieldCurve, FlatCurve};
///
/// let curve = FlatCurve::new(0.05_f64);
/// assert_eq!(curve.zero_rate(5.0).unwrap(), 0.05);
/// assert_eq!(curve.short_rate(5.0).unwrap(), 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCurve<T: Float> {
    rate: T,
}

impl<T: Float> FlatCurve<T> {
    /// Curve at `rate`.
    #[inline]
    pub fn new(rate: T) -> Self {
        Self { rate }
    }

    /// The constant rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }
}

impl<T: Float> YieldCurve<T> for FlatCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        require_maturity(t)?;
        Ok((-self.rate * t).exp())
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        require_positive_maturity(t).map(|_| self.rate)
    }

    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        require_interval(t1, t2).map(|_| self.rate)
    }

    fn short_rate(&self, t: T) -> Result<T, MarketDataError> {
        require_maturity(t).map(|_| self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factor_is_exponential() {
        let curve = FlatCurve::new(0.05_f64);
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
        for t in [0.25, 1.0, 7.5] {
            assert_relative_eq!(
                curve.discount_factor(t).unwrap(),
                (-0.05 * t).exp(),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_rates_reject_bad_times() {
        let curve = FlatCurve::new(0.05_f64);
        assert_eq!(
            curve.discount_factor(-1.0),
            Err(MarketDataError::InvalidMaturity { t: -1.0 })
        );
        assert!(curve.short_rate(-0.5).is_err());
        assert!(curve.zero_rate(0.0).is_err());
        assert!(matches!(
            curve.forward_rate(2.0, 1.0),
            Err(MarketDataError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_negative_rate_grows_money() {
        let curve = FlatCurve::new(-0.01_f32);
        assert!(curve.discount_factor(3.0).unwrap() > 1.0);
        assert_eq!(curve.short_rate(0.0).unwrap(), -0.01);
    }
}
