//! # Pricer Adapters
//!
//! Turn model parameters and a payoff into a PDE problem, solve it and read
//! prices and sensitivities off the resulting surfaces.
//!
//! - [`TwoStateMarkovChainPricer`]: forward equation in strike space for the
//!   two-regime CEV model; one solve prices every strike on the mesh
//! - [`CevPdePricer`]: backward equation in spot space for a single CEV
//!   regime with discounting from a yield curve
//!
//! Both check that the grid spans the spot (or forward) and every requested
//! strike before solving.

pub mod cev;
pub mod markov_chain;

pub use cev::CevPdePricer;
pub use markov_chain::{RegimeSurfaces, SpotSensitivity, StrikeQuote, TwoStateMarkovChainPricer};

use pricer_core::math::grid::PdeGrid;

use crate::pde::PdeError;

/// Tolerance used when checking that a mesh edge sits at zero.
const ORIGIN_TOLERANCE: f64 = 1e-12;

/// Fail unless `level` lies strictly inside the space mesh and every strike
/// lies inside its closed range.
pub(crate) fn ensure_spans(
    grid: &PdeGrid,
    level_name: &str,
    level: f64,
    strikes: &[f64],
) -> Result<(), PdeError> {
    let space = grid.space_mesh();
    let (lo, hi) = (space.start(), space.end());
    if !(level.is_finite() && level > lo && level < hi) {
        return Err(PdeError::configuration(format!(
            "{level_name} {level} is not inside the space mesh ({lo}, {hi})"
        )));
    }
    if let Some(&strike) = strikes.iter().find(|&&k| !(k.is_finite() && k >= lo && k <= hi)) {
        return Err(PdeError::configuration(format!(
            "strike {strike} is not inside the space mesh [{lo}, {hi}]"
        )));
    }
    Ok(())
}

/// Fail unless the space mesh starts at zero.
pub(crate) fn ensure_space_origin(grid: &PdeGrid) -> Result<(), PdeError> {
    let start = grid.space_mesh().start();
    if start.abs() > ORIGIN_TOLERANCE {
        return Err(PdeError::configuration(format!(
            "space mesh must start at zero, got {start}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::math::meshing::{MeshGenerator, UniformMesh};

    fn grid(start: f64) -> PdeGrid {
        let time = UniformMesh::new(0.0, 1.0, 3).unwrap().generate().unwrap();
        let space = UniformMesh::new(start, 1.0, 11).unwrap().generate().unwrap();
        PdeGrid::new(time, space).unwrap()
    }

    #[test]
    fn test_spans() {
        let grid = grid(0.0);
        assert!(ensure_spans(&grid, "spot", 0.5, &[0.0, 1.0]).is_ok());
        assert!(ensure_spans(&grid, "spot", 1.0, &[0.5]).is_err());
        assert!(ensure_spans(&grid, "spot", 0.5, &[1.2]).is_err());
        assert!(ensure_spans(&grid, "spot", f64::NAN, &[]).is_err());
    }

    #[test]
    fn test_origin() {
        assert!(ensure_space_origin(&grid(0.0)).is_ok());
        assert!(ensure_space_origin(&grid(0.1)).is_err());
    }
}
