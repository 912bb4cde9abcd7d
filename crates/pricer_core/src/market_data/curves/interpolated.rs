//! Interpolated yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::{
    as_f64, require_maturity, require_positive_maturity, MarketDataError,
};
use crate::math::interpolators::{Interpolator, LinearInterpolator};
use num_traits::Float;

/// Interpolation method for yield curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CurveInterpolation {
    /// Linear interpolation on zero rates.
    Linear,

    /// Linear interpolation on `ln D(t)`, i.e. piecewise constant forwards.
    #[default]
    LogLinear,
}

/// Yield curve interpolated between `(tenor, zero rate)` pillars.
///
/// Beyond the pillars the edge zero rate is held flat when extrapolation
/// is allowed; otherwise such queries fail with
/// `MarketDataError::BeyondPillars`.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{CurveInterpolation, InterpolatedCurve, YieldCurve};
///
/// let curve = InterpolatedCurve::new(
///     &[0.5_f64, 1.0, 2.0, 5.0],
///     &[0.02, 0.025, 0.03, 0.04],
///     CurveInterpolation::Linear,
///     true,
/// )
/// .unwrap();
///
/// assert!((curve.zero_rate(1.5).unwrap() - 0.0275).abs() < 1e-12);
/// assert!((curve.zero_rate(10.0).unwrap() - 0.04).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedCurve<T: Float> {
    interpolator: LinearInterpolator<T>,
    method: CurveInterpolation,
    allow_extrapolation: bool,
}

impl<T: Float> InterpolatedCurve<T> {
    /// Construct an interpolated curve from pillar points.
    ///
    /// # Arguments
    ///
    /// * `tenors` - Strictly increasing, positive tenors in years (at least 2)
    /// * `rates` - Corresponding zero rates
    /// * `method` - Interpolation method to use
    /// * `allow_extrapolation` - Whether to extrapolate flat beyond the pillars
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InsufficientData` - Fewer than 2 pillars or mismatched lengths
    /// * `MarketDataError::InvalidMaturity` - A non-positive tenor
    /// * `MarketDataError::Interpolation` - Tenors not strictly increasing
    pub fn new(
        tenors: &[T],
        rates: &[T],
        method: CurveInterpolation,
        allow_extrapolation: bool,
    ) -> Result<Self, MarketDataError> {
        if tenors.len() < 2 {
            return Err(MarketDataError::InsufficientData {
                got: tenors.len(),
                need: 2,
            });
        }
        if tenors.len() != rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: rates.len(),
                need: tenors.len(),
            });
        }
        if let Some(&t) = tenors.iter().find(|&&t| t <= T::zero()) {
            require_positive_maturity(t)?;
        }

        let ordinates: Vec<T> = match method {
            CurveInterpolation::Linear => rates.to_vec(),
            CurveInterpolation::LogLinear => tenors
                .iter()
                .zip(rates)
                .map(|(&t, &r)| -r * t)
                .collect(),
        };
        let interpolator = LinearInterpolator::new(tenors, &ordinates)?;

        Ok(Self {
            interpolator,
            method,
            allow_extrapolation,
        })
    }

    /// Tenor domain `(t_min, t_max)`.
    #[inline]
    pub fn domain(&self) -> (T, T) {
        self.interpolator.domain()
    }

    /// Interpolation method.
    #[inline]
    pub fn method(&self) -> CurveInterpolation {
        self.method
    }

    /// Whether extrapolation is allowed.
    #[inline]
    pub fn allow_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn rate_at(&self, t: T) -> Result<T, MarketDataError> {
        let (t_min, t_max) = self.domain();
        let xs = self.interpolator.xs();
        let ys = self.interpolator.ys();
        let edge = if t < t_min {
            Some(0)
        } else if t > t_max {
            Some(xs.len() - 1)
        } else {
            None
        };

        match edge {
            Some(i) if self.allow_extrapolation => Ok(match self.method {
                CurveInterpolation::Linear => ys[i],
                CurveInterpolation::LogLinear => -ys[i] / xs[i],
            }),
            Some(_) => Err(MarketDataError::BeyondPillars {
                t: as_f64(t),
                first: as_f64(t_min),
                last: as_f64(t_max),
            }),
            None => {
                let y = self.interpolator.interpolate(t)?;
                Ok(match self.method {
                    CurveInterpolation::Linear => y,
                    CurveInterpolation::LogLinear => -y / t,
                })
            }
        }
    }
}

impl<T: Float> YieldCurve<T> for InterpolatedCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        require_maturity(t)?;
        if t == T::zero() {
            return Ok(T::one());
        }
        let rate = self.rate_at(t)?;
        Ok((-rate * t).exp())
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        require_positive_maturity(t)?;
        self.rate_at(t)
    }
}
