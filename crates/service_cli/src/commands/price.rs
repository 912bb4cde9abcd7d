//! Price command implementation
//!
//! Solves the forward equation once and reports price, dual delta, dual
//! gamma and theta at each configured strike, optionally with forward
//! delta and gamma from bumped solves.

use pricer_models::instruments::OptionType;
use pricer_pricing::pricer::TwoStateMarkovChainPricer;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::output::{optional, write_rows, OutputFormat, TableRow};
use crate::Result;

/// One line of the price report.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRow {
    pub strike: f64,
    pub price: f64,
    pub dual_delta: f64,
    pub dual_gamma: f64,
    pub theta: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
}

impl TableRow for PriceRow {
    fn headers() -> &'static [&'static str] {
        &["Strike", "Price", "dV/dK", "d2V/dK2", "Theta", "Delta", "Gamma"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{:.4}", self.strike),
            format!("{:.8}", self.price),
            format!("{:.6}", self.dual_delta),
            format!("{:.4}", self.dual_gamma),
            optional(self.theta, 8),
            optional(self.delta, 6),
            optional(self.gamma, 4),
        ]
    }
}

/// Run the price command
pub fn run(config: &AppConfig, option: OptionType, format: OutputFormat, bump: Option<f64>) -> Result<()> {
    let forward = config.model.forward;
    let strikes = &config.grid.strikes;
    let grid = config.grid()?;
    let curve = config.curve()?;
    let pricer = TwoStateMarkovChainPricer::new(config.model()?, config.solver()?)?;

    info!(
        forward,
        expiry = config.grid.expiry,
        strikes = strikes.len(),
        time_nodes = grid.num_time_nodes(),
        space_nodes = grid.num_space_nodes(),
        %option,
        "pricing"
    );

    let surfaces = pricer.solve_with_budget(forward, &grid, &config.budget()?)?;
    let quotes = pricer.quotes(&surfaces, curve.as_ref(), strikes, option)?;

    let sensitivities = match bump {
        Some(bump) => Some(pricer.spot_sensitivities(forward, curve.as_ref(), &grid, strikes, option, bump)?),
        None => None,
    };

    let rows: Vec<PriceRow> = quotes
        .iter()
        .enumerate()
        .map(|(j, q)| {
            let sensitivity = sensitivities.as_ref().map(|s| s[j]);
            PriceRow {
                strike: q.strike,
                price: q.price,
                dual_delta: q.dual_delta,
                dual_gamma: q.dual_gamma,
                theta: q.theta,
                delta: sensitivity.map(|s| s.delta),
                gamma: sensitivity.map(|s| s.gamma),
            }
        })
        .collect();

    write_rows(&rows, format, std::io::stdout().lock())?;
    info!("Pricing complete");
    Ok(())
}
