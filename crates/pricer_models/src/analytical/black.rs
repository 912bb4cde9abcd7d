//! Black (1976) formula on forwards.
//!
//! ## Mathematical Formulas
//!
//! **Call**: C = F·N(d₁) - K·N(d₂)
//! **Put**: P = K·N(-d₂) - F·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(F/K) + σ²T/2) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! Prices are undiscounted. When `σ√T` falls below
//! [`SINGULARITY_THRESHOLD`] the formula has a removable singularity and the
//! intrinsic value `max(±(F - K), 0)` is returned instead.

use pricer_core::math::SINGULARITY_THRESHOLD;

use super::distributions::norm_cdf;
use super::error::AnalyticalError;
use crate::instruments::OptionType;

/// Undiscounted Black price of a European option on a forward.
///
/// # Arguments
/// * `forward` - Forward level (must be positive)
/// * `strike` - Strike (must be non-negative; zero gives the forward itself for a call)
/// * `expiry` - Time to expiry in years (must be non-negative)
/// * `volatility` - Lognormal volatility (must be non-negative)
/// * `option` - Call or put
///
/// # Errors
/// The matching `AnalyticalError` variant for any out-of-range input.
///
/// # Examples
/// ```
/// use pricer_models::analytical::black_price;
/// use pricer_models::instruments::OptionType;
///
/// let call = black_price(0.03, 0.03, 5.0, 0.2, OptionType::Call).unwrap();
/// let put = black_price(0.03, 0.03, 5.0, 0.2, OptionType::Put).unwrap();
/// assert!((call - put).abs() < 1e-15);
///
/// // Zero variance collapses to intrinsic value
/// let intrinsic = black_price(0.05, 0.03, 0.0, 0.2, OptionType::Call).unwrap();
/// assert!((intrinsic - 0.02).abs() < 1e-15);
/// ```
pub fn black_price(
    forward: f64,
    strike: f64,
    expiry: f64,
    volatility: f64,
    option: OptionType,
) -> Result<f64, AnalyticalError> {
    if !(forward.is_finite() && forward > 0.0) {
        return Err(AnalyticalError::InvalidForward { forward });
    }
    if !(strike.is_finite() && strike >= 0.0) {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !(expiry.is_finite() && expiry >= 0.0) {
        return Err(AnalyticalError::InvalidExpiry { expiry });
    }
    if !(volatility.is_finite() && volatility >= 0.0) {
        return Err(AnalyticalError::InvalidVolatility { volatility });
    }

    let std_dev = volatility * expiry.sqrt();
    if std_dev < SINGULARITY_THRESHOLD || strike == 0.0 {
        return Ok(option.payoff(forward, strike));
    }

    let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
    let d2 = d1 - std_dev;
    let price = match option {
        OptionType::Call => forward * norm_cdf(d1) - strike * norm_cdf(d2),
        OptionType::Put => strike * norm_cdf(-d2) - forward * norm_cdf(-d1),
    };
    Ok(price.max(0.0))
}
