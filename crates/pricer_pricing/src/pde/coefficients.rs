//! Coefficient functions of a linear second-order parabolic operator.

use std::fmt;
use std::sync::Arc;

/// Shared, thread-safe coefficient function of `(x, t)`.
pub type CoefficientFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Coefficients of the spatial operator
///
/// ```text
/// L V = a(x, t) V_xx + b(x, t) V_x + c(x, t) V
/// ```
///
/// The solver advances `V_t = L V` in its configured time direction.
/// Coefficients are pure functions and are shared by reference counting, so
/// cloning is cheap and the same set may drive concurrent solves.
///
/// # Example
///
/// ```
/// use pricer_pricing::pde::PdeCoefficients;
///
/// // Black-Scholes in spot space with r = 5%, σ = 20%
/// let (r, sigma) = (0.05, 0.2);
/// let coefficients = PdeCoefficients::new(
///     move |x, _t| 0.5 * sigma * sigma * x * x,
///     move |x, _t| r * x,
///     move |_x, _t| -r,
/// );
/// assert!((coefficients.diffusion(100.0, 0.0) - 200.0).abs() < 1e-9);
/// ```
#[derive(Clone)]
pub struct PdeCoefficients {
    a: CoefficientFn,
    b: CoefficientFn,
    c: CoefficientFn,
}

impl PdeCoefficients {
    /// Build from diffusion `a`, convection `b` and reaction `c`.
    pub fn new<A, B, C>(a: A, b: B, c: C) -> Self
    where
        A: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        B: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        C: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            a: Arc::new(a),
            b: Arc::new(b),
            c: Arc::new(c),
        }
    }

    /// Constant coefficients.
    pub fn constant(a: f64, b: f64, c: f64) -> Self {
        Self::new(move |_, _| a, move |_, _| b, move |_, _| c)
    }

    /// Diffusion coefficient `a(x, t)`.
    #[inline]
    pub fn diffusion(&self, x: f64, t: f64) -> f64 {
        (self.a)(x, t)
    }

    /// Convection coefficient `b(x, t)`.
    #[inline]
    pub fn convection(&self, x: f64, t: f64) -> f64 {
        (self.b)(x, t)
    }

    /// Reaction coefficient `c(x, t)`.
    #[inline]
    pub fn reaction(&self, x: f64, t: f64) -> f64 {
        (self.c)(x, t)
    }
}

impl fmt::Debug for PdeCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdeCoefficients").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let c = PdeCoefficients::constant(1.0, -2.0, 0.5);
        assert_eq!(c.diffusion(3.0, 1.0), 1.0);
        assert_eq!(c.convection(-1.0, 0.0), -2.0);
        assert_eq!(c.reaction(0.0, 9.0), 0.5);
    }

    #[test]
    fn test_clone_shares_functions() {
        let c = PdeCoefficients::new(|x, t| x * t, |_, _| 0.0, |_, _| 0.0);
        let d = c.clone();
        assert_eq!(d.diffusion(2.0, 3.0), 6.0);
        assert!(format!("{d:?}").starts_with("PdeCoefficients"));
    }
}
