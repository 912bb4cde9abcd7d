//! Two-regime CEV model driven by a continuous-time Markov chain.
//!
//! The forward follows, in regime `s`,
//!
//! ```text
//! dF_t = σ_s F_t^{β_s} dW_t
//! ```
//!
//! while the regime jumps from 1 to 2 at intensity `λ12` and from 2 to 1 at
//! intensity `λ21`. The regime probabilities solve the Kolmogorov forward
//! equation of the chain and have the closed form
//!
//! ```text
//! p1(t) = π1 + (p0 - π1) e^{-Λt},   Λ = λ12 + λ21,   π1 = λ21 / Λ
//! ```
//!
//! For `Λ < SINGULARITY_THRESHOLD` the chain never leaves its initial
//! distribution and `p1(t) = p0`.

use std::fmt;

use pricer_core::math::SINGULARITY_THRESHOLD;

use super::error::ModelError;

/// One of the two states of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Regime {
    /// First regime (usually the low-volatility one).
    First,
    /// Second regime.
    Second,
}

impl Regime {
    /// Both regimes, in index order.
    pub const ALL: [Regime; 2] = [Regime::First, Regime::Second];

    /// Zero-based index.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Regime::First => 0,
            Regime::Second => 1,
        }
    }

    /// The other regime.
    #[inline]
    pub fn other(self) -> Regime {
        match self {
            Regime::First => Regime::Second,
            Regime::Second => Regime::First,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "regime {}", self.index() + 1)
    }
}

/// Parameters of the two-state Markov-chain CEV model.
///
/// # Examples
///
/// ```
/// use pricer_models::models::TwoStateMarkovChain;
///
/// let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
///
/// let [p1, p2] = model.state_probability(0.0);
/// assert_eq!(p1, 1.0);
/// assert_eq!(p2, 0.0);
///
/// let pi = model.stationary_probability();
/// assert!((pi - 4.0 / 4.3).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoStateMarkovChain {
    /// Volatility in the first regime.
    pub vol1: f64,
    /// Volatility in the second regime.
    pub vol2: f64,
    /// Transition intensity from the first to the second regime.
    pub lambda12: f64,
    /// Transition intensity from the second to the first regime.
    pub lambda21: f64,
    /// Probability of starting in the first regime.
    pub p0: f64,
    /// CEV exponent in the first regime.
    pub beta1: f64,
    /// CEV exponent in the second regime.
    pub beta2: f64,
}

impl TwoStateMarkovChain {
    /// Create validated model parameters.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(
        vol1: f64,
        vol2: f64,
        lambda12: f64,
        lambda21: f64,
        p0: f64,
        beta1: f64,
        beta2: f64,
    ) -> Result<Self, ModelError> {
        let model = Self {
            vol1,
            vol2,
            lambda12,
            lambda21,
            p0,
            beta1,
            beta2,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check every parameter against its admissible range.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidVolatility` unless both vols are positive and finite
    /// - `ModelError::InvalidElasticity` unless both exponents lie in `[0, 1]`
    /// - `ModelError::InvalidTransitionRate` unless both intensities are non-negative and finite
    /// - `ModelError::InvalidProbability` unless `p0` lies in `[0, 1]`
    pub fn validate(&self) -> Result<(), ModelError> {
        for regime in Regime::ALL {
            let vol = self.volatility(regime);
            if !(vol.is_finite() && vol > 0.0) {
                return Err(ModelError::InvalidVolatility { regime, value: vol });
            }
            let beta = self.elasticity(regime);
            if !(0.0..=1.0).contains(&beta) {
                return Err(ModelError::InvalidElasticity {
                    regime,
                    value: beta,
                });
            }
            let rate = self.exit_rate(regime);
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(ModelError::InvalidTransitionRate {
                    regime,
                    value: rate,
                });
            }
        }
        if !(0.0..=1.0).contains(&self.p0) {
            return Err(ModelError::InvalidProbability(self.p0));
        }
        Ok(())
    }

    /// Volatility `σ_s`.
    #[inline]
    pub fn volatility(&self, regime: Regime) -> f64 {
        match regime {
            Regime::First => self.vol1,
            Regime::Second => self.vol2,
        }
    }

    /// CEV exponent `β_s`.
    #[inline]
    pub fn elasticity(&self, regime: Regime) -> f64 {
        match regime {
            Regime::First => self.beta1,
            Regime::Second => self.beta2,
        }
    }

    /// Intensity of leaving `regime`.
    #[inline]
    pub fn exit_rate(&self, regime: Regime) -> f64 {
        match regime {
            Regime::First => self.lambda12,
            Regime::Second => self.lambda21,
        }
    }

    /// Local volatility `σ_s x^{β_s}` at level `x >= 0`.
    #[inline]
    pub fn local_volatility(&self, regime: Regime, x: f64) -> f64 {
        self.volatility(regime) * x.max(0.0).powf(self.elasticity(regime))
    }

    /// Whether both regimes are lognormal (`β1 = β2 = 1`).
    #[inline]
    pub fn is_lognormal(&self) -> bool {
        self.beta1 == 1.0 && self.beta2 == 1.0
    }

    /// Total intensity `Λ = λ12 + λ21`.
    #[inline]
    pub fn total_rate(&self) -> f64 {
        self.lambda12 + self.lambda21
    }

    /// Long-run probability of the first regime, `λ21 / Λ`.
    ///
    /// A frozen chain (`Λ` below the singularity threshold) keeps its initial
    /// distribution, so `p0` is returned.
    pub fn stationary_probability(&self) -> f64 {
        let total = self.total_rate();
        if total < SINGULARITY_THRESHOLD {
            return self.p0;
        }
        self.lambda21 / total
    }

    /// Probabilities `[p1(t), p2(t)]` of occupying each regime at time `t`.
    pub fn state_probability(&self, t: f64) -> [f64; 2] {
        let total = self.total_rate();
        let p1 = if total < SINGULARITY_THRESHOLD {
            self.p0
        } else {
            let pi = self.lambda21 / total;
            pi + (self.p0 - pi) * (-total * t).exp()
        };
        [p1, 1.0 - p1]
    }

    /// Generator matrix `Q` of the chain; `Q[i][j]` is the intensity of
    /// jumping from regime `i` to regime `j`, rows sum to zero.
    pub fn generator(&self) -> [[f64; 2]; 2] {
        [
            [-self.lambda12, self.lambda12],
            [self.lambda21, -self.lambda21],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn reference() -> TwoStateMarkovChain {
        TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TwoStateMarkovChain::new(0.0, 0.7, 0.3, 4.0, 1.0, 1.0, 1.0),
            Err(ModelError::InvalidVolatility {
                regime: Regime::First,
                ..
            })
        ));
        assert!(matches!(
            TwoStateMarkovChain::new(0.15, 0.7, 0.3, 4.0, 1.0, 1.0, 1.2),
            Err(ModelError::InvalidElasticity {
                regime: Regime::Second,
                ..
            })
        ));
        assert!(matches!(
            TwoStateMarkovChain::new(0.15, 0.7, -0.3, 4.0, 1.0, 1.0, 1.0),
            Err(ModelError::InvalidTransitionRate {
                regime: Regime::First,
                ..
            })
        ));
        assert_eq!(
            TwoStateMarkovChain::new(0.15, 0.7, 0.3, 4.0, 1.5, 1.0, 1.0),
            Err(ModelError::InvalidProbability(1.5))
        );
        assert!(TwoStateMarkovChain::new(0.15, 0.7, 0.0, 0.0, 0.5, 0.0, 0.5).is_ok());
    }

    #[test]
    fn test_state_probability_limits() {
        let model = reference();
        let [p1, p2] = model.state_probability(0.0);
        assert_eq!(p1, 1.0);
        assert_eq!(p2, 0.0);

        let [p1, _] = model.state_probability(100.0);
        assert_relative_eq!(p1, model.stationary_probability(), epsilon = 1e-15);
    }

    #[test]
    fn test_state_probability_solves_kolmogorov() {
        // dp1/dt = -λ12 p1 + λ21 p2
        let model = reference();
        let t = 0.37;
        let h = 1e-6;
        let [p_up, _] = model.state_probability(t + h);
        let [p_dn, _] = model.state_probability(t - h);
        let [p1, p2] = model.state_probability(t);
        let derivative = (p_up - p_dn) / (2.0 * h);
        assert_relative_eq!(
            derivative,
            -model.lambda12 * p1 + model.lambda21 * p2,
            epsilon = 1e-7
        );
    }

    #[test]
    fn test_frozen_chain_keeps_initial_distribution() {
        let model = TwoStateMarkovChain::new(0.15, 0.7, 0.0, 1e-18, 0.25, 1.0, 1.0).unwrap();
        assert_eq!(model.state_probability(5.0), [0.25, 0.75]);
        assert_eq!(model.stationary_probability(), 0.25);
    }

    #[test]
    fn test_generator_rows_sum_to_zero() {
        let q = reference().generator();
        for row in q {
            assert_eq!(row[0] + row[1], 0.0);
        }
    }

    #[test]
    fn test_local_volatility() {
        let model = TwoStateMarkovChain::new(0.2, 0.4, 1.0, 1.0, 0.5, 0.5, 1.0).unwrap();
        assert_relative_eq!(model.local_volatility(Regime::First, 4.0), 0.4, epsilon = 1e-15);
        assert_relative_eq!(model.local_volatility(Regime::Second, 4.0), 1.6, epsilon = 1e-15);
        assert_eq!(model.local_volatility(Regime::First, 0.0), 0.0);
        assert!(!model.is_lognormal());
    }

    proptest! {
        #[test]
        fn prop_probabilities_stay_in_unit_interval(
            l12 in 0.0..10.0_f64,
            l21 in 0.0..10.0_f64,
            p0 in 0.0..=1.0_f64,
            t in 0.0..50.0_f64,
        ) {
            let model = TwoStateMarkovChain::new(0.1, 0.2, l12, l21, p0, 1.0, 1.0).unwrap();
            let [p1, p2] = model.state_probability(t);
            prop_assert!((-1e-15..=1.0 + 1e-15).contains(&p1));
            prop_assert!((p1 + p2 - 1.0).abs() < 1e-15);
        }
    }
}
