//! Solver configuration.

use pricer_core::math::interpolators::InterpolationMethod;

use super::error::PdeError;

/// Default blending parameter (Crank-Nicolson).
pub const DEFAULT_THETA: f64 = 0.5;

/// Default number of fully implicit start-up steps under Crank-Nicolson.
/// Any other θ starts without them unless asked to.
pub const DEFAULT_IMPLICIT_START_STEPS: usize = 2;

/// Direction in which the time mesh is traversed.
///
/// - `Forward`: from the initial condition at `t_min` up to `t_max`
/// - `Backward`: from the terminal condition at `t_max` down to `t_min`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeDirection {
    /// Initial-value problem in increasing time.
    Forward,
    /// Terminal-value problem in decreasing time.
    #[default]
    Backward,
}

/// Which slices a solve keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResultsStorage {
    /// Every time slice.
    #[default]
    Full,
    /// Only the last slice computed.
    TerminalSlice,
}

/// Immutable theta-method settings.
///
/// # Examples
///
/// ```
/// use pricer_pricing::pde::{ResultsStorage, SolverConfig, TimeDirection};
///
/// let config = SolverConfig::builder()
///     .theta(1.0)
///     .direction(TimeDirection::Forward)
///     .storage(ResultsStorage::TerminalSlice)
///     .build()
///     .unwrap();
/// assert_eq!(config.theta(), 1.0);
/// assert_eq!(config.implicit_start_steps(), 0);
/// assert_eq!(SolverConfig::default().implicit_start_steps(), 2);
///
/// assert!(SolverConfig::builder().theta(1.5).build().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolverConfig {
    theta: f64,
    direction: TimeDirection,
    storage: ResultsStorage,
    implicit_start_steps: usize,
    interpolation: InterpolationMethod,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            direction: TimeDirection::default(),
            storage: ResultsStorage::default(),
            implicit_start_steps: DEFAULT_IMPLICIT_START_STEPS,
            interpolation: InterpolationMethod::default(),
        }
    }
}

impl SolverConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }

    /// Blending parameter θ: 0 explicit, 1 implicit, 0.5 Crank-Nicolson.
    #[inline]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Traversal direction of the time mesh.
    #[inline]
    pub fn direction(&self) -> TimeDirection {
        self.direction
    }

    /// Slices kept in the results.
    #[inline]
    pub fn storage(&self) -> ResultsStorage {
        self.storage
    }

    /// Number of leading steps taken fully implicitly to damp payoff kinks.
    #[inline]
    pub fn implicit_start_steps(&self) -> usize {
        self.implicit_start_steps
    }

    /// Interpolation used by the produced results.
    #[inline]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// θ to use for step `step` (zero-based, in traversal order).
    #[inline]
    pub fn theta_for_step(&self, step: usize) -> f64 {
        if step < self.implicit_start_steps {
            1.0
        } else {
            self.theta
        }
    }

    /// Copy of the configuration with another direction.
    pub fn with_direction(mut self, direction: TimeDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Copy of the configuration with another storage mode.
    pub fn with_storage(mut self, storage: ResultsStorage) -> Self {
        self.storage = storage;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` if θ is not a finite value in `[0, 1]`.
    pub fn validate(&self) -> Result<(), PdeError> {
        if !(0.0..=1.0).contains(&self.theta) {
            return Err(PdeError::configuration(format!(
                "theta must lie in [0, 1], got {}",
                self.theta
            )));
        }
        Ok(())
    }
}

/// Builder for [`SolverConfig`].
#[derive(Debug, Clone, Default)]
pub struct SolverConfigBuilder {
    theta: Option<f64>,
    direction: TimeDirection,
    storage: ResultsStorage,
    implicit_start_steps: Option<usize>,
    interpolation: InterpolationMethod,
}

impl SolverConfigBuilder {
    /// Sets θ in `[0, 1]`.
    ///
    /// Unless [`implicit_start_steps`](Self::implicit_start_steps) is also
    /// set, only θ = 0.5 keeps the implicit start-up steps; a pure explicit
    /// or implicit scheme runs θ from the first step.
    #[inline]
    pub fn theta(mut self, theta: f64) -> Self {
        self.theta = Some(theta);
        self
    }

    /// Sets the time direction.
    #[inline]
    pub fn direction(mut self, direction: TimeDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the storage mode.
    #[inline]
    pub fn storage(mut self, storage: ResultsStorage) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the number of implicit start-up steps (0 disables smoothing).
    #[inline]
    pub fn implicit_start_steps(mut self, steps: usize) -> Self {
        self.implicit_start_steps = Some(steps);
        self
    }

    /// Sets the interpolation method of the results.
    #[inline]
    pub fn interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = method;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// See [`SolverConfig::validate`].
    pub fn build(self) -> Result<SolverConfig, PdeError> {
        let theta = self.theta.unwrap_or(DEFAULT_THETA);
        let default_start_steps = if theta == DEFAULT_THETA {
            DEFAULT_IMPLICIT_START_STEPS
        } else {
            0
        };
        let config = SolverConfig {
            theta,
            direction: self.direction,
            storage: self.storage,
            implicit_start_steps: self.implicit_start_steps.unwrap_or(default_start_steps),
            interpolation: self.interpolation,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::builder().build().unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.theta(), 0.5);
        assert_eq!(config.direction(), TimeDirection::Backward);
        assert_eq!(config.storage(), ResultsStorage::Full);
        assert_eq!(config.interpolation(), InterpolationMethod::Quadratic);
    }

    #[test]
    fn test_rannacher_steps() {
        let config = SolverConfig::builder()
            .theta(0.5)
            .implicit_start_steps(2)
            .build()
            .unwrap();
        assert_eq!(config.theta_for_step(0), 1.0);
        assert_eq!(config.theta_for_step(1), 1.0);
        assert_eq!(config.theta_for_step(2), 0.5);
    }

    #[test]
    fn test_start_steps_follow_theta() {
        let explicit = SolverConfig::builder().theta(0.0).build().unwrap();
        assert_eq!(explicit.implicit_start_steps(), 0);
        assert_eq!(explicit.theta_for_step(0), 0.0);

        let crank_nicolson = SolverConfig::builder().theta(0.5).build().unwrap();
        assert_eq!(crank_nicolson.implicit_start_steps(), DEFAULT_IMPLICIT_START_STEPS);

        let smoothed = SolverConfig::builder()
            .theta(0.0)
            .implicit_start_steps(1)
            .build()
            .unwrap();
        assert_eq!(smoothed.theta_for_step(0), 1.0);
        assert_eq!(smoothed.theta_for_step(1), 0.0);
    }

    #[test]
    fn test_invalid_theta() {
        assert!(SolverConfig::builder().theta(-0.1).build().is_err());
        assert!(SolverConfig::builder().theta(f64::NAN).build().is_err());
        assert!(SolverConfig::builder().theta(0.0).build().is_ok());
    }
}
