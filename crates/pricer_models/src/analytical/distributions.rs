//! Standard normal distribution functions.
//!
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Complementary error function approximation using Horner's method.
///
/// Abramowitz and Stegun formula 7.1.26, maximum absolute error 1.5e-7.
/// The reflection `erfc(-x) = 2 - erfc(x)` makes `Φ(x) + Φ(-x) = 1` hold
/// exactly, so put-call parity survives the approximation.
#[inline]
fn erfc_approx(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let abs_x = x.abs();
    let t = 1.0 / (1.0 + P * abs_x);
    let poly = A1 + t * (A2 + t * (A3 + t * (A4 + t * A5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < 0.0 {
        2.0 - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// ```text
/// Φ(x) = (1/2) erfc(-x / √2)
/// ```
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0) < 0.01);
/// assert!(norm_cdf(3.0) > 0.99);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc_approx(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density function.
///
/// ```text
/// φ(x) = exp(-x² / 2) / √(2π)
/// ```
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0) - 0.3989422804).abs() < 1e-9);
/// assert!((norm_pdf(1.0) - 0.2419707245).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0), 0.841_344_746, epsilon = 2e-7);
        assert_relative_eq!(norm_cdf(-1.96), 0.024_997_895, epsilon = 2e-7);
        assert_relative_eq!(norm_cdf(2.5), 0.993_790_335, epsilon = 2e-7);
    }

    #[test]
    fn test_norm_cdf_symmetry_is_exact() {
        for &x in &[0.1, 0.7, 1.3, 2.9, 5.0] {
            assert_eq!(norm_cdf(x) + norm_cdf(-x), 1.0);
        }
    }

    #[test]
    fn test_norm_cdf_monotone() {
        let xs: Vec<f64> = (-80..=80).map(|i| i as f64 * 0.1).collect();
        for w in xs.windows(2) {
            assert!(norm_cdf(w[1]) >= norm_cdf(w[0]));
        }
    }

    #[test]
    fn test_norm_pdf_symmetric() {
        assert_eq!(norm_pdf(1.5), norm_pdf(-1.5));
    }
}
