//! Crosscheck command implementation
//!
//! Prices the configured strikes with both the PDE and the Monte Carlo
//! estimator and fails if any difference exceeds four standard errors plus
//! the configured relative tolerance.

use pricer_models::instruments::OptionType;
use pricer_pricing::mc::MarkovChainMonteCarlo;
use pricer_pricing::pricer::TwoStateMarkovChainPricer;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::output::{write_rows, OutputFormat, TableRow};
use crate::{CliError, Result};

/// Standard errors allowed on top of the relative tolerance.
const STD_ERRORS: f64 = 4.0;

/// One line of the cross-check report.
#[derive(Debug, Clone, Serialize)]
pub struct CrossCheckRow {
    pub strike: f64,
    pub pde: f64,
    pub monte_carlo: f64,
    pub std_error: f64,
    pub difference: f64,
    pub tolerance: f64,
    pub pass: bool,
}

impl TableRow for CrossCheckRow {
    fn headers() -> &'static [&'static str] {
        &["Strike", "PDE", "MC", "Std err", "Diff", "Tolerance", "Pass"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{:.4}", self.strike),
            format!("{:.8}", self.pde),
            format!("{:.8}", self.monte_carlo),
            format!("{:.2e}", self.std_error),
            format!("{:+.2e}", self.difference),
            format!("{:.2e}", self.tolerance),
            if self.pass { "yes" } else { "NO" }.to_string(),
        ]
    }
}

/// Compare a PDE price with a Monte Carlo estimate.
pub fn compare(strike: f64, pde: f64, monte_carlo: f64, std_error: f64, relative: f64) -> CrossCheckRow {
    let difference = pde - monte_carlo;
    let tolerance = STD_ERRORS * std_error + relative * monte_carlo.abs();
    CrossCheckRow {
        strike,
        pde,
        monte_carlo,
        std_error,
        difference,
        tolerance,
        pass: difference.abs() <= tolerance,
    }
}

/// Run the crosscheck command
pub fn run(config: &AppConfig, option: OptionType, format: OutputFormat) -> Result<()> {
    let forward = config.model.forward;
    let expiry = config.grid.expiry;
    let strikes = &config.grid.strikes;
    let model = config.model()?;
    let curve = config.curve()?;
    let grid = config.grid()?;

    let pricer = TwoStateMarkovChainPricer::new(model, config.solver()?)?;
    let surfaces = pricer.solve_with_budget(forward, &grid, &config.budget()?)?;
    let quotes = pricer.quotes(&surfaces, curve.as_ref(), strikes, option)?;

    let mc_config = config.monte_carlo()?;
    info!(
        paths = mc_config.n_paths(),
        steps = mc_config.n_steps(),
        seed = mc_config.effective_seed(),
        "running Monte Carlo"
    );
    let estimates = MarkovChainMonteCarlo::new(model, mc_config)?.price(forward, expiry, strikes, option)?;

    let discount = curve.discount_factor(expiry).map_err(pricer_pricing::pde::PdeError::from)?;
    let rows: Vec<CrossCheckRow> = quotes
        .iter()
        .zip(&estimates)
        .map(|(q, e)| {
            compare(
                q.strike,
                q.price,
                discount * e.price,
                discount * e.std_error,
                config.monte_carlo.tolerance,
            )
        })
        .collect();

    write_rows(&rows, format, std::io::stdout().lock())?;

    let failures = rows.iter().filter(|r| !r.pass).count();
    if failures > 0 {
        warn!(failures, total = rows.len(), "PDE and Monte Carlo disagree");
        return Err(CliError::CrossCheckFailed {
            failures,
            total: rows.len(),
        });
    }
    info!("Cross-check passed");
    Ok(())
}
