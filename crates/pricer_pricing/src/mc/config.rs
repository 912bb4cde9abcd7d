//! Simulation settings for the regime-path estimator.
//!
//! Paths are simulated in batches; batch `b` draws from its own generator
//! seeded with `seed + b`, which is what makes the estimate independent of
//! the rayon thread count.

use std::ops::RangeInclusive;

use super::error::ConfigError;

/// Admissible path counts.
pub const PATH_RANGE: RangeInclusive<usize> = 1..=10_000_000;

/// Admissible Euler step counts per path.
pub const STEP_RANGE: RangeInclusive<usize> = 1..=10_000;

/// Admissible batch sizes.
pub const BATCH_RANGE: RangeInclusive<usize> = 1..=1 << 20;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 20_240_601;

/// Paths simulated when no count is given.
pub const DEFAULT_PATHS: usize = 100_000;

/// Euler steps per path when no count is given.
pub const DEFAULT_EULER_STEPS: usize = 200;

/// Paths per independently seeded batch when no size is given.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Validated estimator settings.
///
/// The Euler step count only matters when at least one regime has `β ≠ 1`;
/// purely lognormal models are sampled without time stepping.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .n_steps(250)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert_eq!(config.n_batches(), 10);
/// assert_eq!(config.effective_seed(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonteCarloConfig {
    paths: usize,
    euler_steps: usize,
    batch_size: usize,
    seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            paths: DEFAULT_PATHS,
            euler_steps: DEFAULT_EULER_STEPS,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    /// Builder starting from the defaults.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Total number of simulated paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.paths
    }

    /// Euler steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.euler_steps
    }

    /// Paths per batch (the last batch may be shorter).
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Configured seed, if any.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Configured seed or [`DEFAULT_SEED`].
    #[inline]
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Number of batches covering all paths.
    #[inline]
    pub fn n_batches(&self) -> usize {
        self.paths.div_ceil(self.batch_size)
    }

    /// Number of paths in batch `batch`.
    #[inline]
    pub fn batch_len(&self, batch: usize) -> usize {
        self.batch_size
            .min(self.paths.saturating_sub(batch * self.batch_size))
    }

    /// Generator seed for batch `batch`.
    #[inline]
    pub fn batch_seed(&self, batch: usize) -> u64 {
        self.effective_seed().wrapping_add(batch as u64)
    }

    /// Check every count against its admissible range.
    ///
    /// # Errors
    ///
    /// `ConfigError::OutOfRange` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("paths", self.paths, &PATH_RANGE)?;
        check_range("euler_steps", self.euler_steps, &STEP_RANGE)?;
        check_range("batch_size", self.batch_size, &BATCH_RANGE)
    }
}

fn check_range(
    name: &'static str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Builder for [`MonteCarloConfig`]; unset fields keep their defaults.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    config: MonteCarloConfig,
}

impl MonteCarloConfigBuilder {
    /// Total number of paths.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.config.paths = n_paths;
        self
    }

    /// Euler steps per path.
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.config.euler_steps = n_steps;
        self
    }

    /// Paths per independently seeded batch.
    #[inline]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Base seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate and return the settings.
    ///
    /// # Errors
    ///
    /// See [`MonteCarloConfig::validate`].
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
