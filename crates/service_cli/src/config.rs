//! Run configuration management
//!
//! Handles loading configuration from a TOML file, environment variables and
//! CLI arguments, and turns it into validated model, grid, solver and Monte
//! Carlo settings.
//!
//! ```toml
//! log_level = "info"
//!
//! [model]
//! forward = 0.03
//! vol1 = 0.15
//! vol2 = 0.70
//!
//! [grid]
//! expiry = 5.0
//! strikes = [0.02, 0.03, 0.04]
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use pricer_core::market_data::{CurveInterpolation, FlatCurve, InterpolatedCurve, YieldCurve};
use pricer_core::math::grid::PdeGrid;
use pricer_core::math::interpolators::InterpolationMethod;
use pricer_core::math::meshing::{ExponentialMesh, HyperbolicMesh, MeshGenerator};
use pricer_models::models::TwoStateMarkovChain;
use pricer_pricing::mc::MonteCarloConfig;
use pricer_pricing::pde::{PdeError, ResultsStorage, SolveBudget, SolverConfig};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "regime-pde.toml";

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "REGIME_PDE_LOG_LEVEL";

/// Environment variable overriding the Monte Carlo seed.
pub const ENV_SEED: &str = "REGIME_PDE_SEED";

/// Log levels accepted in the file, the environment and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::Config(format!(
                "invalid log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogLevel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// `[model]`: two-regime CEV parameters and the forward level.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub forward: f64,
    pub vol1: f64,
    pub vol2: f64,
    pub lambda12: f64,
    pub lambda21: f64,
    pub p0: f64,
    pub beta1: f64,
    pub beta2: f64,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            forward: 0.03,
            vol1: 0.15,
            vol2: 0.70,
            lambda12: 0.3,
            lambda21: 4.0,
            p0: 1.0,
            beta1: 1.0,
            beta2: 1.0,
        }
    }
}

/// `[grid]`: time and strike meshes and the strikes to report.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub expiry: f64,
    pub time_points: usize,
    pub time_concentration: f64,
    pub strike_max: f64,
    pub space_points: usize,
    pub space_concentration: f64,
    pub strikes: Vec<f64>,
    /// Move the nearest mesh nodes onto the forward and the strikes.
    pub pin_strikes: bool,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            expiry: 5.0,
            time_points: 51,
            time_concentration: 7.5,
            strike_max: 0.3,
            space_points: 151,
            space_concentration: 0.01,
            strikes: vec![0.01, 0.02, 0.025, 0.03, 0.035, 0.04, 0.05, 0.06, 0.08],
            pin_strikes: false,
        }
    }
}

/// `[solver]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSection {
    pub theta: f64,
    /// Unset: two under Crank-Nicolson, none for any other θ.
    pub implicit_start_steps: Option<usize>,
    pub interpolation: InterpolationMethod,
    pub storage: ResultsStorage,
    pub max_steps: Option<usize>,
    pub max_seconds: Option<f64>,
}

impl Default for SolverSection {
    fn default() -> Self {
        let defaults = SolverConfig::default();
        Self {
            theta: defaults.theta(),
            implicit_start_steps: None,
            interpolation: defaults.interpolation(),
            storage: defaults.storage(),
            max_steps: None,
            max_seconds: None,
        }
    }
}

/// `[monte_carlo]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonteCarloSection {
    pub paths: usize,
    pub steps: usize,
    pub seed: Option<u64>,
    /// Relative tolerance on top of four standard errors.
    pub tolerance: f64,
}

impl Default for MonteCarloSection {
    fn default() -> Self {
        Self {
            paths: 10_000,
            steps: 200,
            seed: None,
            tolerance: 0.02,
        }
    }
}

/// `[curve]`: a flat rate, or zero-rate pillars when `tenors` is non-empty.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurveSection {
    pub rate: f64,
    pub tenors: Vec<f64>,
    pub rates: Vec<f64>,
    pub interpolation: CurveInterpolation,
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub model: ModelSection,
    pub grid: GridSection,
    pub solver: SolverSection,
    pub monte_carlo: MonteCarloSection,
    pub curve: CurveSection,
}

/// Values given on the command line; `None` leaves lower layers in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub seed: Option<u64>,
    pub paths: Option<usize>,
    pub strikes: Option<Vec<f64>>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Apply overrides from environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            let seed = seed
                .trim()
                .parse()
                .map_err(|_| CliError::Config(format!("{ENV_SEED} must be an integer, got '{seed}'")))?;
            self.monte_carlo.seed = Some(seed);
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence).
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) -> Result<()> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        if let Some(seed) = cli.seed {
            self.monte_carlo.seed = Some(seed);
        }
        if let Some(paths) = cli.paths {
            self.monte_carlo.paths = paths;
        }
        if let Some(strikes) = &cli.strikes {
            self.grid.strikes = strikes.clone();
        }
        Ok(())
    }

    /// Check every section by building what it describes.
    pub fn validate(&self) -> Result<()> {
        self.model()?;
        self.grid()?;
        self.solver()?;
        self.monte_carlo()?;
        self.curve()?;
        if self.grid.strikes.is_empty() {
            return Err(CliError::Config("at least one strike is required".to_string()));
        }
        if !(self.monte_carlo.tolerance.is_finite() && self.monte_carlo.tolerance >= 0.0) {
            return Err(CliError::Config(format!(
                "monte_carlo.tolerance must be non-negative, got {}",
                self.monte_carlo.tolerance
            )));
        }
        Ok(())
    }

    /// Model parameters.
    pub fn model(&self) -> Result<TwoStateMarkovChain> {
        let m = &self.model;
        TwoStateMarkovChain::new(m.vol1, m.vol2, m.lambda12, m.lambda21, m.p0, m.beta1, m.beta2)
            .map_err(|e| CliError::Config(format!("[model] {e}")))
    }

    /// Time mesh from 0 to expiry, concentrated at the start; strike mesh
    /// from 0 to `strike_max`, concentrated at the forward.
    pub fn grid(&self) -> Result<Arc<PdeGrid>> {
        let g = &self.grid;
        let grid_error = |e: pricer_core::types::GridError| CliError::Config(format!("[grid] {e}"));

        let time = ExponentialMesh::new(0.0, g.expiry, g.time_points, g.time_concentration)
            .and_then(|mesh| mesh.generate())
            .map_err(grid_error)?;
        let mut space = HyperbolicMesh::new(
            0.0,
            g.strike_max,
            self.model.forward,
            g.space_points,
            g.space_concentration,
        )
        .and_then(|mesh| mesh.generate())
        .map_err(grid_error)?;

        if g.pin_strikes {
            let mut points: Vec<f64> = std::iter::once(self.model.forward)
                .chain(g.strikes.iter().copied())
                .filter(|&k| k > 0.0 && k < g.strike_max)
                .collect();
            points.sort_by(f64::total_cmp);
            points.dedup();
            space = space.with_fixed_points(&points).map_err(grid_error)?;
        }

        Ok(Arc::new(PdeGrid::new(time, space).map_err(grid_error)?))
    }

    /// Solver configuration.
    pub fn solver(&self) -> Result<SolverConfig> {
        let s = &self.solver;
        let mut builder = SolverConfig::builder()
            .theta(s.theta)
            .interpolation(s.interpolation)
            .storage(s.storage);
        if let Some(steps) = s.implicit_start_steps {
            builder = builder.implicit_start_steps(steps);
        }
        builder
            .build()
            .map_err(|e: PdeError| CliError::Config(format!("[solver] {e}")))
    }

    /// Step and wall-clock limits for each solve.
    pub fn budget(&self) -> Result<SolveBudget> {
        let mut budget = SolveBudget::unlimited();
        if let Some(steps) = self.solver.max_steps {
            budget = budget.with_max_steps(steps);
        }
        if let Some(seconds) = self.solver.max_seconds {
            let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
                CliError::Config(format!("[solver] max_seconds must be non-negative, got {seconds}"))
            })?;
            budget = budget.with_max_duration(duration);
        }
        Ok(budget)
    }

    /// Monte Carlo configuration.
    pub fn monte_carlo(&self) -> Result<MonteCarloConfig> {
        let mc = &self.monte_carlo;
        let mut builder = MonteCarloConfig::builder().n_paths(mc.paths).n_steps(mc.steps);
        if let Some(seed) = mc.seed {
            builder = builder.seed(seed);
        }
        builder
            .build()
            .map_err(|e| CliError::Config(format!("[monte_carlo] {e}")))
    }

    /// Discount curve.
    pub fn curve(&self) -> Result<Box<dyn YieldCurve<f64> + Send + Sync>> {
        let c = &self.curve;
        if c.tenors.is_empty() {
            if !c.rate.is_finite() {
                return Err(CliError::Config(format!("[curve] rate must be finite, got {}", c.rate)));
            }
            return Ok(Box::new(FlatCurve::new(c.rate)));
        }
        let curve = InterpolatedCurve::new(&c.tenors, &c.rates, c.interpolation, true)
            .map_err(|e| CliError::Config(format!("[curve] {e}")))?;
        Ok(Box::new(curve))
    }
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliOverrides) -> Result<AppConfig> {
    let mut config = match &cli.config_file {
        Some(path) if !path.exists() => return Err(CliError::FileNotFound(path.clone())),
        Some(path) => AppConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            AppConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => AppConfig::default(),
    };

    config.apply_env()?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
