//! Single-regime CEV pricing through the backward equation in spot space.
//!
//! Under the risk-neutral measure `dS = r(t) S dt + σ S^β dW`, so the option
//! value satisfies
//!
//! ```text
//! ∂V/∂t + ½ σ² S^{2β} ∂²V/∂S² + r(t) S ∂V/∂S - r(t) V = 0
//! ```
//!
//! stepped back from the payoff at expiry. Calls vanish at `S = 0` and grow
//! with unit slope at the top of the mesh; puts are worth the discounted
//! strike at `S = 0` and flatten out at the top.

use std::sync::Arc;

use pricer_core::market_data::YieldCurve;
use pricer_core::math::grid::PdeGrid;
use pricer_core::math::interpolators::LinearInterpolator;
use pricer_models::analytical::black_price;
use pricer_models::instruments::OptionType;
use rayon::prelude::*;
use tracing::debug;

use super::{ensure_space_origin, ensure_spans};
use crate::pde::{
    BoundaryCondition, PdeCoefficients, PdeError, PdeProblem, ResultsGrid, SolverConfig,
    ThetaMethodSolver, TimeDirection,
};

/// PDE pricer for European options under a CEV diffusion.
///
/// The grid's time axis is calendar time ending at expiry; its space axis is
/// the spot, starting at zero.
#[derive(Debug, Clone)]
pub struct CevPdePricer {
    volatility: f64,
    beta: f64,
    solver: ThetaMethodSolver,
}

impl CevPdePricer {
    /// Create a pricer; the configuration is switched to backward stepping.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` unless `volatility` is positive and finite
    /// and `beta` lies in `[0, 1]`, or if `config` is invalid.
    pub fn new(volatility: f64, beta: f64, config: SolverConfig) -> Result<Self, PdeError> {
        if !(volatility.is_finite() && volatility > 0.0) {
            return Err(PdeError::configuration(format!(
                "CEV volatility must be positive, got {volatility}"
            )));
        }
        if !(0.0..=1.0).contains(&beta) {
            return Err(PdeError::configuration(format!(
                "CEV exponent must lie in [0, 1], got {beta}"
            )));
        }
        config.validate()?;
        Ok(Self {
            volatility,
            beta,
            solver: ThetaMethodSolver::new(config.with_direction(TimeDirection::Backward)),
        })
    }

    /// CEV volatility `σ`.
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// CEV exponent `β`.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Solver configuration in use.
    pub fn config(&self) -> &SolverConfig {
        self.solver.config()
    }

    /// Solve for the value surface of one option.
    ///
    /// # Errors
    ///
    /// - `PdeError::Configuration` if the space mesh does not start at zero
    ///   or does not contain `strike`
    /// - `PdeError::MarketData` if the curve cannot be evaluated on the time mesh
    /// - any solver error
    pub fn solve<C>(
        &self,
        strike: f64,
        curve: &C,
        grid: &Arc<PdeGrid>,
        option: OptionType,
    ) -> Result<ResultsGrid, PdeError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        ensure_space_origin(grid)?;
        let space = grid.space_mesh();
        if !(strike.is_finite() && strike >= space.start() && strike <= space.end()) {
            return Err(PdeError::configuration(format!(
                "strike {strike} is not inside the space mesh [{}, {}]",
                space.start(),
                space.end()
            )));
        }

        let times = grid.time_mesh().nodes();
        let expiry = grid.time_mesh().end();
        let rates = times
            .iter()
            .map(|&t| curve.short_rate(t))
            .collect::<Result<Vec<f64>, _>>()?;
        let rate = Arc::new(LinearInterpolator::new(times, &rates)?);

        let (vol, beta) = (self.volatility, self.beta);
        let coefficients = {
            let drift = Arc::clone(&rate);
            let discount = Arc::clone(&rate);
            PdeCoefficients::new(
                move |x, _t| 0.5 * vol * vol * x.powf(2.0 * beta),
                move |x, t| drift.interpolate_extrapolating(t) * x,
                move |_x, t| -discount.interpolate_extrapolating(t),
            )
        };

        let (lower, upper) = match option {
            OptionType::Call => (
                BoundaryCondition::dirichlet(0.0, |_| 0.0),
                BoundaryCondition::neumann(space.end(), |_| 1.0),
            ),
            OptionType::Put => {
                let terminal = curve.discount_factor(expiry)?;
                let ratios = times
                    .iter()
                    .map(|&t| -> Result<f64, PdeError> { Ok(terminal / curve.discount_factor(t)?) })
                    .collect::<Result<Vec<f64>, _>>()?;
                let ratio = LinearInterpolator::new(times, &ratios)?;
                (
                    BoundaryCondition::dirichlet(0.0, move |t| {
                        strike * ratio.interpolate_extrapolating(t)
                    }),
                    BoundaryCondition::neumann(space.end(), |_| 0.0),
                )
            }
        };

        let problem = PdeProblem::from_fn(
            Arc::clone(grid),
            coefficients,
            |s| option.payoff(s, strike),
            lower,
            upper,
        )?;
        debug!(strike, %option, vol, beta, "solving CEV backward equation");
        self.solver.solve(&problem)
    }

    /// Present value at `spot` of one option expiring at the end of the time mesh.
    ///
    /// # Errors
    ///
    /// See [`solve`](Self::solve); also `PdeError::Configuration` if `spot`
    /// is not strictly inside the space mesh.
    pub fn price<C>(
        &self,
        spot: f64,
        strike: f64,
        curve: &C,
        grid: &Arc<PdeGrid>,
        option: OptionType,
    ) -> Result<f64, PdeError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        ensure_spans(grid, "spot", spot, &[strike])?;
        let surface = self.solve(strike, curve, grid, option)?;
        surface.interpolate(spot, grid.time_mesh().start())
    }

    /// Present values for several strikes, solved in parallel.
    ///
    /// # Errors
    ///
    /// The first error encountered, as for [`price`](Self::price).
    pub fn price_strikes<C>(
        &self,
        spot: f64,
        strikes: &[f64],
        curve: &C,
        grid: &Arc<PdeGrid>,
        option: OptionType,
    ) -> Result<Vec<f64>, PdeError>
    where
        C: YieldCurve<f64> + Sync + ?Sized,
    {
        ensure_spans(grid, "spot", spot, strikes)?;
        strikes
            .par_iter()
            .map(|&strike| self.price(spot, strike, curve, grid, option))
            .collect()
    }

    /// Closed-form price for `β = 1`: `D(T) Black(S / D(T), K, T, σ)`.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` unless `β = 1`; analytical and market data
    /// errors otherwise.
    pub fn black_reference<C>(
        &self,
        spot: f64,
        strike: f64,
        expiry: f64,
        curve: &C,
        option: OptionType,
    ) -> Result<f64, PdeError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        if self.beta != 1.0 {
            return Err(PdeError::configuration(format!(
                "Black reference needs a lognormal diffusion, got β = {}",
                self.beta
            )));
        }
        let discount = curve.discount_factor(expiry)?;
        let undiscounted = black_price(spot / discount, strike, expiry, self.volatility, option)?;
        Ok(discount * undiscounted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pde::ErrorKind;
    use approx::assert_relative_eq;
    use pricer_core::market_data::FlatCurve;
    use pricer_core::math::meshing::{HyperbolicMesh, MeshGenerator, UniformMesh};

    fn grid() -> Arc<PdeGrid> {
        let time = UniformMesh::new(0.0, 1.0, 101).unwrap().generate().unwrap();
        let space = HyperbolicMesh::new(0.0, 400.0, 100.0, 201, 0.1)
            .unwrap()
            .generate()
            .unwrap();
        Arc::new(PdeGrid::new(time, space).unwrap())
    }

    #[test]
    fn test_lognormal_matches_black() {
        let pricer = CevPdePricer::new(0.2, 1.0, SolverConfig::default()).unwrap();
        let curve = FlatCurve::new(0.03);
        let grid = grid();
        for option in [OptionType::Call, OptionType::Put] {
            let pde = pricer.price(100.0, 100.0, &curve, &grid, option).unwrap();
            let exact = pricer.black_reference(100.0, 100.0, 1.0, &curve, option).unwrap();
            assert_relative_eq!(pde, exact, epsilon = 2e-2);
        }
    }

    #[test]
    fn test_put_call_parity_holds_for_any_beta() {
        let pricer = CevPdePricer::new(2.0, 0.5, SolverConfig::default()).unwrap();
        let curve = FlatCurve::new(0.03);
        let grid = grid();
        let strikes = [80.0, 100.0, 120.0];
        let calls = pricer
            .price_strikes(100.0, &strikes, &curve, &grid, OptionType::Call)
            .unwrap();
        let puts = pricer
            .price_strikes(100.0, &strikes, &curve, &grid, OptionType::Put)
            .unwrap();
        let df = (-0.03_f64).exp();
        for ((c, p), k) in calls.iter().zip(&puts).zip(strikes) {
            assert_relative_eq!(c - p, 100.0 - k * df, epsilon = 1e-4);
        }
        assert!(calls.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_black_reference_needs_lognormal() {
        let pricer = CevPdePricer::new(2.0, 0.5, SolverConfig::default()).unwrap();
        let err = pricer
            .black_reference(100.0, 100.0, 1.0, &FlatCurve::new(0.0), OptionType::Call)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(CevPdePricer::new(0.0, 1.0, SolverConfig::default()).is_err());
        assert!(CevPdePricer::new(0.2, 1.5, SolverConfig::default()).is_err());
        assert!(CevPdePricer::new(f64::NAN, 0.5, SolverConfig::default()).is_err());
    }

    #[test]
    fn test_spot_outside_mesh() {
        let pricer = CevPdePricer::new(0.2, 1.0, SolverConfig::default()).unwrap();
        let err = pricer
            .price(500.0, 100.0, &FlatCurve::new(0.0), &grid(), OptionType::Call)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
