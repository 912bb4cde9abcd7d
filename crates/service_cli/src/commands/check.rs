//! Check command implementation
//!
//! Validates the configuration, describes the meshes and model, and runs a
//! terminal-slice solve to confirm the engine conserves the forward.

use pricer_models::models::Regime;
use pricer_pricing::pde::ResultsStorage;
use pricer_pricing::pricer::TwoStateMarkovChainPricer;
use tracing::info;

use crate::config::AppConfig;
use crate::{CliError, Result};

/// Relative tolerance on `C(0, T) = F`.
const MASS_TOLERANCE: f64 = 1e-10;

fn spacing_range(nodes: &[f64]) -> (f64, f64) {
    nodes
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((f64::INFINITY, 0.0), |(lo, hi), h| (lo.min(h), hi.max(h)))
}

/// Run the check command
pub fn run(config: &AppConfig) -> Result<()> {
    info!("Checking configuration...");
    let model = config.model()?;
    let grid = config.grid()?;
    config.solver()?;
    config.monte_carlo()?;
    config.curve()?;

    let forward = config.model.forward;
    let expiry = config.grid.expiry;
    let (dt_min, dt_max) = spacing_range(grid.time_mesh().nodes());
    let (dk_min, dk_max) = spacing_range(grid.space_mesh().nodes());

    println!("Model");
    for regime in Regime::ALL {
        println!(
            "  {regime}: σ = {:.4}, β = {:.2}, exit rate = {:.4}",
            model.volatility(regime),
            model.elasticity(regime),
            model.exit_rate(regime)
        );
    }
    let [p1, p2] = model.state_probability(expiry);
    println!("  P(regime at T) = [{p1:.6}, {p2:.6}], stationary = {:.6}", model.stationary_probability());
    println!("Grid");
    println!(
        "  time:   {} nodes on [0, {expiry}], Δt in [{dt_min:.3e}, {dt_max:.3e}]",
        grid.num_time_nodes()
    );
    println!(
        "  strike: {} nodes on [0, {}], ΔK in [{dk_min:.3e}, {dk_max:.3e}]",
        grid.num_space_nodes(),
        config.grid.strike_max
    );

    let solver = config.solver()?.with_storage(ResultsStorage::TerminalSlice);
    let pricer = TwoStateMarkovChainPricer::new(model, solver)?;
    let surfaces = pricer.solve_with_budget(forward, &grid, &config.budget()?)?;
    let at_zero = surfaces.total.value_at(0, surfaces.total.num_time_nodes() - 1);
    let error = (at_zero - forward).abs() / forward;
    println!("Solve");
    println!("  C(0, T) = {at_zero:.10}, forward = {forward}, relative error = {error:.2e}");

    if error > MASS_TOLERANCE {
        return Err(CliError::Config(format!(
            "call at zero strike {at_zero} does not match the forward {forward}"
        )));
    }
    println!("OK");
    Ok(())
}
