//! Monte Carlo cross-check for the two-state Markov-chain CEV model.
//!
//! Regime paths are sampled exactly from exponential holding times. Given a
//! regime path:
//!
//! - if both regimes are lognormal the forward is lognormal with total
//!   variance `σ1² τ1 + σ2² τ2` (`τ_s` the time spent in regime `s`), so each
//!   path contributes a conditional Black price
//! - otherwise the forward is stepped with Euler and absorbed at zero
//!
//! Prices are undiscounted, in the measure under which the forward is a
//! martingale. This estimator exists to validate the PDE pricer and has
//! different error characteristics; it is not a production pricing path.

use rayon::prelude::*;
use tracing::debug;

use pricer_models::analytical::black_price;
use pricer_models::instruments::OptionType;
use pricer_models::models::{ModelError, Regime, TwoStateMarkovChain};

use super::config::MonteCarloConfig;
use super::error::{ConfigError, McError};
use crate::rng::PricerRng;

/// Price and standard error for one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McEstimate {
    /// Strike of the option.
    pub strike: f64,
    /// Sample mean of the (conditional) payoff.
    pub price: f64,
    /// Standard error of the sample mean.
    pub std_error: f64,
}

/// Running sums for one batch of paths.
#[derive(Debug, Clone)]
struct BatchSums {
    paths: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl BatchSums {
    fn new(strikes: usize) -> Self {
        Self {
            paths: 0,
            sum: vec![0.0; strikes],
            sum_sq: vec![0.0; strikes],
        }
    }

    fn add(&mut self, sample: &[f64]) {
        self.paths += 1;
        for ((s, q), &v) in self.sum.iter_mut().zip(&mut self.sum_sq).zip(sample) {
            *s += v;
            *q += v * v;
        }
    }

    fn merge(&mut self, other: &BatchSums) {
        self.paths += other.paths;
        for (s, o) in self.sum.iter_mut().zip(&other.sum) {
            *s += o;
        }
        for (q, o) in self.sum_sq.iter_mut().zip(&other.sum_sq) {
            *q += o;
        }
    }
}

/// Regime occupation of one path, plus the switch times for Euler stepping.
#[derive(Debug, Clone, Default)]
struct RegimePath {
    start: Option<Regime>,
    switches: Vec<f64>,
    occupation: [f64; 2],
}

impl RegimePath {
    fn sample(&mut self, model: &TwoStateMarkovChain, expiry: f64, rng: &mut PricerRng) {
        self.switches.clear();
        self.occupation = [0.0; 2];
        let mut regime = if rng.gen_uniform() < model.p0 {
            Regime::First
        } else {
            Regime::Second
        };
        self.start = Some(regime);
        let mut t = 0.0;
        loop {
            let hold = rng.gen_exponential(model.exit_rate(regime));
            if t + hold >= expiry {
                self.occupation[regime.index()] += expiry - t;
                break;
            }
            self.occupation[regime.index()] += hold;
            t += hold;
            self.switches.push(t);
            regime = regime.other();
        }
    }

    /// Regime occupied at time `t`.
    fn regime_at(&self, t: f64) -> Regime {
        let start = self.start.unwrap_or(Regime::First);
        let jumps = self.switches.partition_point(|&s| s <= t);
        if jumps % 2 == 0 {
            start
        } else {
            start.other()
        }
    }
}

/// Monte Carlo estimator for European options under the two-state model.
///
/// Paths are split into fixed-size batches seeded from the configured seed
/// and simulated in parallel with rayon; batch results are merged in batch
/// order, so estimates are reproducible regardless of thread count.
///
/// # Example
///
/// ```
/// use pricer_models::instruments::OptionType;
/// use pricer_models::models::TwoStateMarkovChain;
/// use pricer_pricing::mc::{MarkovChainMonteCarlo, MonteCarloConfig};
///
/// let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
/// let config = MonteCarloConfig::builder().n_paths(2_000).n_steps(50).seed(1).build().unwrap();
/// let mc = MarkovChainMonteCarlo::new(model, config).unwrap();
///
/// let estimates = mc.price(0.03, 1.0, &[0.02, 0.03, 0.05], OptionType::Call).unwrap();
/// assert_eq!(estimates.len(), 3);
/// assert!(estimates[0].price > estimates[2].price);
/// ```
#[derive(Debug, Clone)]
pub struct MarkovChainMonteCarlo {
    model: TwoStateMarkovChain,
    config: MonteCarloConfig,
}

impl MarkovChainMonteCarlo {
    /// Create an estimator for validated parameters.
    ///
    /// # Errors
    ///
    /// `McError::Model` or `McError::Config` for invalid inputs.
    pub fn new(model: TwoStateMarkovChain, config: MonteCarloConfig) -> Result<Self, McError> {
        model.validate()?;
        config.validate()?;
        Ok(Self { model, config })
    }

    /// Model parameters.
    pub fn model(&self) -> &TwoStateMarkovChain {
        &self.model
    }

    /// Simulation settings.
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Undiscounted prices of `option` on `forward` for every strike.
    ///
    /// # Errors
    ///
    /// - `McError::Model` for a non-positive forward
    /// - `McError::Config` for a non-positive expiry or a negative strike
    pub fn price(
        &self,
        forward: f64,
        expiry: f64,
        strikes: &[f64],
        option: OptionType,
    ) -> Result<Vec<McEstimate>, McError> {
        if !(forward.is_finite() && forward > 0.0) {
            return Err(ModelError::InvalidForward(forward).into());
        }
        if !(expiry.is_finite() && expiry > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "expiry",
                value: format!("{expiry} (must be positive)"),
            }
            .into());
        }
        if let Some(&strike) = strikes.iter().find(|k| !(k.is_finite() && **k >= 0.0)) {
            return Err(ConfigError::InvalidParameter {
                name: "strike",
                value: format!("{strike} (must be non-negative)"),
            }
            .into());
        }

        let n_paths = self.config.n_paths();
        let n_batches = self.config.n_batches();
        let seed = self.config.effective_seed();
        debug!(
            n_paths,
            n_batches,
            seed,
            lognormal = self.model.is_lognormal(),
            "starting regime-path simulation"
        );

        let batches = (0..n_batches)
            .into_par_iter()
            .map(|batch| {
                let mut rng = PricerRng::from_seed(self.config.batch_seed(batch));
                self.simulate_batch(
                    self.config.batch_len(batch),
                    forward,
                    expiry,
                    strikes,
                    option,
                    &mut rng,
                )
            })
            .collect::<Result<Vec<BatchSums>, McError>>()?;

        let mut total = BatchSums::new(strikes.len());
        for batch in &batches {
            total.merge(batch);
        }

        let n = total.paths as f64;
        let estimates = strikes
            .iter()
            .enumerate()
            .map(|(j, &strike)| {
                let mean = total.sum[j] / n;
                let variance = if total.paths > 1 {
                    ((total.sum_sq[j] / n - mean * mean) * n / (n - 1.0)).max(0.0)
                } else {
                    0.0
                };
                McEstimate {
                    strike,
                    price: mean,
                    std_error: (variance / n).sqrt(),
                }
            })
            .collect();
        debug!(n_paths, "regime-path simulation finished");
        Ok(estimates)
    }

    fn simulate_batch(
        &self,
        paths: usize,
        forward: f64,
        expiry: f64,
        strikes: &[f64],
        option: OptionType,
        rng: &mut PricerRng,
    ) -> Result<BatchSums, McError> {
        let mut sums = BatchSums::new(strikes.len());
        let mut path = RegimePath::default();
        let mut sample = vec![0.0; strikes.len()];
        let mut normals = vec![0.0; self.config.n_steps()];

        for _ in 0..paths {
            path.sample(&self.model, expiry, rng);
            if self.model.is_lognormal() {
                let variance = self.model.vol1 * self.model.vol1 * path.occupation[0]
                    + self.model.vol2 * self.model.vol2 * path.occupation[1];
                let vol = (variance / expiry).sqrt();
                for (value, &strike) in sample.iter_mut().zip(strikes) {
                    *value = black_price(forward, strike, expiry, vol, option)?;
                }
            } else {
                rng.fill_normal(&mut normals);
                let terminal = self.euler_terminal(forward, expiry, &path, &normals);
                for (value, &strike) in sample.iter_mut().zip(strikes) {
                    *value = option.payoff(terminal, strike);
                }
            }
            sums.add(&sample);
        }
        Ok(sums)
    }

    /// Euler scheme for `dF = σ_s F^β_s dW`, absorbed at zero.
    fn euler_terminal(&self, forward: f64, expiry: f64, path: &RegimePath, normals: &[f64]) -> f64 {
        let dt = expiry / normals.len() as f64;
        let sqrt_dt = dt.sqrt();
        let mut f = forward;
        for (step, z) in normals.iter().enumerate() {
            let regime = path.regime_at(step as f64 * dt);
            f += self.model.local_volatility(regime, f) * sqrt_dt * z;
            if f <= 0.0 {
                return 0.0;
            }
        }
        f
    }
}
