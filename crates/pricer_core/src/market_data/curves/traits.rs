//! The discount curve abstraction seen by the pricers.

use crate::market_data::error::{require_interval, require_positive_maturity, MarketDataError};
use num_traits::Float;

/// Width of the interval used by the default [`YieldCurve::short_rate`].
const SHORT_RATE_INTERVAL: f64 = 1e-4;

/// Discount curve, as a function of time in years from the valuation date.
///
/// Implementors only have to supply [`discount_factor`](Self::discount_factor);
/// rates are derived from it:
///
/// ```text
/// r(t)      = -ln D(t) / t
/// f(t1, t2) = -ln(D(t2) / D(t1)) / (t2 - t1)
/// r_s(t)    ≈ f(t, t + 1e-4)
/// ```
///
/// Implementations must satisfy `D(0) = 1` and `D(t) > 0` for `t >= 0`.
/// Negative times fail with `MarketDataError::InvalidMaturity`.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{YieldCurve, FlatCurve};
///
/// let curve = FlatCurve::new(0.05_f64);
///
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
///
/// let fwd = curve.forward_rate(1.0, 2.0).unwrap();
/// assert!((fwd - 0.05).abs() < 1e-10);
/// ```
pub trait YieldCurve<T: Float> {
    /// Discount factor `D(t)`.
    ///
    /// # Errors
    ///
    /// `MarketDataError::InvalidMaturity` if `t < 0`.
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError>;

    /// Continuously compounded zero rate; requires `t > 0`.
    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        require_positive_maturity(t)?;
        Ok(-self.discount_factor(t)?.ln() / t)
    }

    /// Continuously compounded forward rate over `[t1, t2]`.
    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        require_interval(t1, t2)?;
        let ratio = self.discount_factor(t2)? / self.discount_factor(t1)?;
        Ok(-ratio.ln() / (t2 - t1))
    }

    /// Instantaneous short rate at `t`, the drift and discount term of a
    /// backward pricing equation.
    fn short_rate(&self, t: T) -> Result<T, MarketDataError> {
        let h = T::from(SHORT_RATE_INTERVAL).unwrap_or_else(T::epsilon);
        self.forward_rate(t, t + h)
    }
}

impl<T: Float, C: YieldCurve<T> + ?Sized> YieldCurve<T> for Box<C> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        (**self).discount_factor(t)
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        (**self).zero_rate(t)
    }

    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        (**self).forward_rate(t1, t2)
    }

    fn short_rate(&self, t: T) -> Result<T, MarketDataError> {
        (**self).short_rate(t)
    }
}
