//! Two-regime CEV pricing through the forward Kolmogorov equation.
//!
//! Let `C_s(K, T) = E[(F_T - K)⁺ 1{regime at T = s}]`. Integrating the
//! Fokker-Planck equation of `(F, regime)` twice against the call payoff
//! gives, for each regime,
//!
//! ```text
//! ∂C_s/∂T = ½ σ_s² K^{2β_s} ∂²C_s/∂K² + Σ_r Q[r][s] C_r
//! ```
//!
//! with `Q` the generator of the chain. The system starts from
//! `C_s(K, 0) = p_s(0) (F - K)⁺` and is pinned at `K = 0` by
//! `C_s(0, T) = F p_s(T)`. At the top the strike mesh is extended by a
//! geometric tail reaching several standard deviations above the forward,
//! where `C_s = 0` holds to machine precision; the tail is cut off again
//! before the surfaces are returned. One forward solve therefore prices every strike for every expiry on the
//! time mesh; the call price is `C_1 + C_2`, puts follow from parity, and
//! the strike and expiry derivatives of the surface give dual delta, dual
//! gamma (the terminal density of the forward) and theta.

use std::sync::Arc;

use pricer_core::market_data::YieldCurve;
use pricer_core::math::grid::PdeGrid;
use pricer_core::math::meshing::Mesh;
use pricer_models::instruments::OptionType;
use pricer_models::models::{ModelError, Regime, TwoStateMarkovChain};
use tracing::debug;

use super::{ensure_space_origin, ensure_spans};
use crate::pde::{
    BoundaryCondition2D, CoupledPdeProblem, CoupledThetaSolver, PdeCoefficients, PdeError,
    ResultsGrid, ResultsStorage, SolveBudget, SolverConfig, TimeDirection,
};

/// Tolerance on the start of the time mesh.
const TIME_ORIGIN_TOLERANCE: f64 = 1e-12;

/// Standard deviations of log-moneyness between the forward and the far
/// strike boundary.
const FAR_FIELD_DEVIATIONS: f64 = 8.0;

/// Cap on the log-moneyness of the far strike boundary.
const MAX_FAR_FIELD_LOG_MONEYNESS: f64 = 25.0;

/// Ratio between successive cells of the far-field tail.
const FAR_FIELD_GROWTH: f64 = 1.1;

/// Price and strike/expiry sensitivities for one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeQuote {
    /// Strike.
    pub strike: f64,
    /// Discounted option price.
    pub price: f64,
    /// Discounted `∂V/∂K`.
    pub dual_delta: f64,
    /// Discounted `∂²V/∂K²`.
    pub dual_gamma: f64,
    /// `∂(D(T) V)/∂T`; `None` unless every time slice was kept.
    pub theta: Option<f64>,
}

/// Sensitivities to the forward level for one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpotSensitivity {
    /// Strike.
    pub strike: f64,
    /// Discounted `∂V/∂F` by central difference.
    pub delta: f64,
    /// Discounted `∂²V/∂F²` by central difference.
    pub gamma: f64,
}

/// Undiscounted call surfaces from one solve.
#[derive(Debug, Clone)]
pub struct RegimeSurfaces {
    /// `C_s(K, T)` for each regime, indexed by [`Regime::index`].
    pub regimes: [ResultsGrid; 2],
    /// `C_1 + C_2`.
    pub total: ResultsGrid,
    /// Forward level the surfaces were solved for.
    pub forward: f64,
}

impl RegimeSurfaces {
    /// Surface of one regime.
    pub fn regime(&self, regime: Regime) -> &ResultsGrid {
        &self.regimes[regime.index()]
    }
}

/// PDE pricer for the two-state Markov-chain CEV model.
///
/// The grid's space axis is the strike, starting at zero; its time axis runs
/// from 0 to the option expiry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pricer_core::market_data::FlatCurve;
/// use pricer_core::math::grid::PdeGrid;
/// use pricer_core::math::meshing::Mesh;
/// use pricer_core::math::meshing::{ExponentialMesh, HyperbolicMesh, MeshGenerator};
/// use pricer_models::instruments::OptionType;
/// use pricer_models::models::TwoStateMarkovChain;
/// use pricer_pricing::pde::SolverConfig;
/// use pricer_pricing::pricer::TwoStateMarkovChainPricer;
///
/// let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
/// let time = ExponentialMesh::new(0.0, 1.0, 21, 5.0).unwrap().generate().unwrap();
/// let strikes = HyperbolicMesh::new(0.0, 0.3, 0.03, 101, 0.01).unwrap().generate().unwrap();
/// let grid = Arc::new(PdeGrid::new(time, strikes).unwrap());
///
/// let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
/// let quotes = pricer
///     .price(0.03, &FlatCurve::new(0.0), &grid, &[0.02, 0.03, 0.04], OptionType::Call)
///     .unwrap();
/// assert!(quotes[0].price > quotes[1].price && quotes[1].price > quotes[2].price);
/// assert!(quotes.iter().all(|q| q.dual_gamma > 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct TwoStateMarkovChainPricer {
    model: TwoStateMarkovChain,
    solver: CoupledThetaSolver,
}

impl TwoStateMarkovChainPricer {
    /// Create a pricer; the configuration is switched to forward stepping.
    ///
    /// # Errors
    ///
    /// `PdeError::Model` for invalid parameters, `PdeError::Configuration`
    /// for an invalid solver configuration.
    pub fn new(model: TwoStateMarkovChain, config: SolverConfig) -> Result<Self, PdeError> {
        model.validate()?;
        config.validate()?;
        let config = config.with_direction(TimeDirection::Forward);
        Ok(Self {
            model,
            solver: CoupledThetaSolver::new(config),
        })
    }

    /// Model parameters.
    pub fn model(&self) -> &TwoStateMarkovChain {
        &self.model
    }

    /// Solver configuration in use.
    pub fn config(&self) -> &SolverConfig {
        self.solver.config()
    }

    /// Strike beyond which every call price is negligible: the forward moved
    /// up [`FAR_FIELD_DEVIATIONS`] standard deviations of the widest regime,
    /// measured with its lognormal volatility at the forward.
    fn far_field_strike(&self, forward: f64, expiry: f64) -> f64 {
        let vol = Regime::ALL
            .iter()
            .map(|&regime| self.model.local_volatility(regime, forward) / forward)
            .fold(0.0, f64::max);
        let sd = vol * expiry.max(0.0).sqrt();
        let log_moneyness =
            (FAR_FIELD_DEVIATIONS * sd + 0.5 * sd * sd).min(MAX_FAR_FIELD_LOG_MONEYNESS);
        forward * log_moneyness.exp()
    }

    /// The grid the forward equation is solved on: `grid` itself when its
    /// strike mesh already reaches the far field, otherwise `grid` with
    /// geometrically growing cells appended up to the far-field strike.
    ///
    /// The first nodes of the result are exactly the nodes of `grid`, so
    /// results solved on it restrict back with [`ResultsGrid::restrict_to`].
    ///
    /// # Errors
    ///
    /// `PdeError::Grid` if the extended mesh cannot be built.
    pub fn solve_grid(&self, forward: f64, grid: &Arc<PdeGrid>) -> Result<Arc<PdeGrid>, PdeError> {
        let space = grid.space_mesh();
        let far = self.far_field_strike(forward, grid.time_mesh().end());
        if space.end() >= far {
            return Ok(Arc::clone(grid));
        }
        let mut nodes = space.nodes().to_vec();
        let mut dx = grid.dx_upper();
        let mut k = space.end();
        while k < far {
            dx *= FAR_FIELD_GROWTH;
            k += dx;
            nodes.push(k);
        }
        debug!(
            k_max = space.end(),
            far,
            added = nodes.len() - space.len(),
            "extending strike mesh to the far field"
        );
        let extended = Mesh::from_nodes(nodes)?;
        Ok(Arc::new(PdeGrid::new(grid.time_mesh().clone(), extended)?))
    }

    /// Assemble the coupled forward problem for `forward`.
    ///
    /// The problem lives on [`solve_grid`](Self::solve_grid), with
    /// `C_s = 0` at its upper strike edge.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` if the grid does not start at zero in both
    /// time and strike or does not contain `forward`.
    pub fn problem(&self, forward: f64, grid: &Arc<PdeGrid>) -> Result<CoupledPdeProblem, PdeError> {
        if !(forward.is_finite() && forward > 0.0) {
            return Err(ModelError::InvalidForward(forward).into());
        }
        ensure_space_origin(grid)?;
        let t0 = grid.time_mesh().start();
        if t0.abs() > TIME_ORIGIN_TOLERANCE {
            return Err(PdeError::configuration(format!(
                "time mesh must start at zero, got {t0}"
            )));
        }
        ensure_spans(grid, "forward", forward, &[])?;
        let grid = self.solve_grid(forward, grid)?;

        let coefficients = Regime::ALL.map(|regime| {
            let model = self.model;
            PdeCoefficients::new(
                move |k, _t| {
                    let vol = model.local_volatility(regime, k);
                    0.5 * vol * vol
                },
                |_, _| 0.0,
                |_, _| 0.0,
            )
        });

        // Equation for C_s picks up Q[r][s] C_r: the transposed generator.
        let q = self.model.generator();
        let coupling = [[q[0][0], q[1][0]], [q[0][1], q[1][1]]];

        let p0 = self.model.state_probability(0.0);
        let initial = p0.map(|p| {
            grid.space_mesh()
                .nodes()
                .iter()
                .map(|&k| p * (forward - k).max(0.0))
                .collect::<Vec<f64>>()
        });

        let model = self.model;
        let lower = BoundaryCondition2D::dirichlet(0.0, move |t, y| {
            let index = if y < 0.5 { 0 } else { 1 };
            forward * model.state_probability(t)[index]
        });
        let upper = BoundaryCondition2D::dirichlet(grid.space_mesh().end(), |_, _| 0.0);

        CoupledPdeProblem::new(grid, coefficients, coupling, initial, lower, upper)
    }

    /// Solve for the undiscounted call surfaces.
    ///
    /// # Errors
    ///
    /// See [`problem`](Self::problem) and [`CoupledThetaSolver::solve`].
    pub fn solve(&self, forward: f64, grid: &Arc<PdeGrid>) -> Result<RegimeSurfaces, PdeError> {
        self.solve_with_budget(forward, grid, &SolveBudget::unlimited())
    }

    /// As [`solve`](Self::solve), honouring `budget`.
    ///
    /// # Errors
    ///
    /// See [`solve`](Self::solve); `PdeError::Cancelled` if the budget runs out.
    pub fn solve_with_budget(
        &self,
        forward: f64,
        grid: &Arc<PdeGrid>,
        budget: &SolveBudget,
    ) -> Result<RegimeSurfaces, PdeError> {
        let problem = self.problem(forward, grid)?;
        let [first, second] = self.solver.solve_with_budget(&problem, budget)?;
        let first = first.restrict_to(grid)?;
        let second = second.restrict_to(grid)?;
        let total = first.try_add(&second)?;
        Ok(RegimeSurfaces {
            regimes: [first, second],
            total,
            forward,
        })
    }

    /// Discounted prices and strike/expiry sensitivities at each strike for
    /// the expiry at the end of the time mesh.
    ///
    /// # Errors
    ///
    /// - `PdeError::Configuration` if a strike lies outside the strike mesh
    /// - `PdeError::MarketData` if the curve cannot discount to expiry
    /// - any error of [`solve`](Self::solve)
    pub fn price<C>(
        &self,
        forward: f64,
        curve: &C,
        grid: &Arc<PdeGrid>,
        strikes: &[f64],
        option: OptionType,
    ) -> Result<Vec<StrikeQuote>, PdeError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        ensure_spans(grid, "forward", forward, strikes)?;
        let surfaces = self.solve(forward, grid)?;
        self.quotes(&surfaces, curve, strikes, option)
    }

    /// Read quotes off already solved surfaces.
    ///
    /// # Errors
    ///
    /// As [`price`](Self::price).
    pub fn quotes<C>(
        &self,
        surfaces: &RegimeSurfaces,
        curve: &C,
        strikes: &[f64],
        option: OptionType,
    ) -> Result<Vec<StrikeQuote>, PdeError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        let total = &surfaces.total;
        let forward = surfaces.forward;
        ensure_spans(total.grid(), "forward", forward, strikes)?;

        let expiry = total.terminal_time();
        let discount = curve.discount_factor(expiry)?;
        let has_history = total.storage() == ResultsStorage::Full;
        let short_rate = if has_history {
            curve.short_rate(expiry)?
        } else {
            0.0
        };

        strikes
            .iter()
            .map(|&strike| {
                let call = total.interpolate(strike, expiry)?;
                let value = option.from_call(call, forward, strike);
                let slope = total.first_derivative_x_at(strike, expiry)?;
                let dual_delta = match option {
                    OptionType::Call => slope,
                    OptionType::Put => slope + 1.0,
                };
                let dual_gamma = total.second_derivative_x_at(strike, expiry)?;
                let theta = if has_history {
                    let dc_dt = total.derivative_t_at(strike, expiry)?;
                    Some(discount * (dc_dt - short_rate * value))
                } else {
                    None
                };
                Ok(StrikeQuote {
                    strike,
                    price: discount * value,
                    dual_delta: discount * dual_delta,
                    dual_gamma: discount * dual_gamma,
                    theta,
                })
            })
            .collect()
    }

    /// Forward delta and gamma by central bumps of relative size
    /// `relative_bump`, solving the base and both bumped problems in
    /// parallel.
    ///
    /// # Errors
    ///
    /// - `PdeError::Configuration` for a non-positive bump or bumped
    ///   forwards outside the mesh
    /// - any error of [`price`](Self::price)
    pub fn spot_sensitivities<C>(
        &self,
        forward: f64,
        curve: &C,
        grid: &Arc<PdeGrid>,
        strikes: &[f64],
        option: OptionType,
        relative_bump: f64,
    ) -> Result<Vec<SpotSensitivity>, PdeError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        if !(relative_bump.is_finite() && relative_bump > 0.0) {
            return Err(PdeError::configuration(format!(
                "relative bump must be positive, got {relative_bump}"
            )));
        }
        let h = forward * relative_bump;
        ensure_spans(grid, "forward", forward, strikes)?;
        ensure_spans(grid, "bumped forward", forward + h, &[])?;
        ensure_spans(grid, "bumped forward", forward - h, &[])?;

        debug!(forward, h, strikes = strikes.len(), "bumping forward");
        let (base, (up, down)) = rayon::join(
            || self.solve(forward, grid),
            || {
                rayon::join(
                    || self.solve(forward + h, grid),
                    || self.solve(forward - h, grid),
                )
            },
        );
        let base = self.quotes(&base?, curve, strikes, option)?;
        let up = self.quotes(&up?, curve, strikes, option)?;
        let down = self.quotes(&down?, curve, strikes, option)?;

        Ok(base
            .iter()
            .zip(up.iter().zip(&down))
            .map(|(b, (u, d))| SpotSensitivity {
                strike: b.strike,
                delta: (u.price - d.price) / (2.0 * h),
                gamma: (u.price - 2.0 * b.price + d.price) / (h * h),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pde::ErrorKind;
    use approx::assert_relative_eq;
    use pricer_core::market_data::FlatCurve;
    use pricer_core::math::meshing::{ExponentialMesh, HyperbolicMesh, MeshGenerator, UniformMesh};
    use pricer_models::analytical::black_price;

    fn grid(expiry: f64, nt: usize, nx: usize) -> Arc<PdeGrid> {
        let time = ExponentialMesh::new(0.0, expiry, nt, 5.0)
            .unwrap()
            .generate()
            .unwrap();
        let space = HyperbolicMesh::new(0.0, 0.3, 0.03, nx, 0.01)
            .unwrap()
            .generate()
            .unwrap();
        Arc::new(PdeGrid::new(time, space).unwrap())
    }

    #[test]
    fn test_identical_regimes_match_black() {
        // Equal lognormal regimes: the mixture is plain Black.
        let model = TwoStateMarkovChain::new(0.3, 0.3, 1.0, 2.0, 0.4, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let grid = grid(1.0, 101, 201);
        let strikes = [0.02, 0.025, 0.03, 0.035, 0.045];
        let quotes = pricer
            .price(0.03, &FlatCurve::new(0.0), &grid, &strikes, OptionType::Call)
            .unwrap();
        for q in &quotes {
            let exact = black_price(0.03, q.strike, 1.0, 0.3, OptionType::Call).unwrap();
            assert_relative_eq!(q.price, exact, epsilon = 5e-5);
        }
    }

    #[test]
    fn test_prices_at_top_of_strike_mesh_match_black() {
        // Wide identical regimes put real mass above K_max = 0.3.
        let model = TwoStateMarkovChain::new(0.7, 0.7, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let grid = grid(5.0, 101, 151);
        let strikes = [0.15, 0.25, 0.3];
        let quotes = pricer
            .price(0.03, &FlatCurve::new(0.0), &grid, &strikes, OptionType::Call)
            .unwrap();
        for q in &quotes {
            let exact = black_price(0.03, q.strike, 5.0, 0.7, OptionType::Call).unwrap();
            assert_relative_eq!(q.price, exact, max_relative = 0.03);
        }
    }

    #[test]
    fn test_solve_grid_extends_to_far_field() {
        let grid = grid(5.0, 11, 51);

        let wide = TwoStateMarkovChain::new(0.7, 0.2, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(wide, SolverConfig::default()).unwrap();
        let extended = pricer.solve_grid(0.03, &grid).unwrap();
        let n = grid.num_space_nodes();
        assert!(extended.num_space_nodes() > n);
        assert_eq!(&extended.space_mesh().nodes()[..n], grid.space_mesh().nodes());
        assert_eq!(extended.time_mesh(), grid.time_mesh());
        assert!(extended.space_mesh().end() >= pricer.far_field_strike(0.03, 5.0));

        // Solved surfaces come back on the caller's mesh.
        let surfaces = pricer.solve(0.03, &grid).unwrap();
        assert_eq!(surfaces.total.space_nodes(), grid.space_mesh().nodes());

        let narrow = TwoStateMarkovChain::new(0.01, 0.01, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(narrow, SolverConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&pricer.solve_grid(0.03, &grid).unwrap(), &grid));
    }

    #[test]
    fn test_regime_surfaces_carry_probabilities() {
        // At K = 0 each regime surface equals F p_s(T).
        let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let grid = grid(2.0, 41, 101);
        let surfaces = pricer.solve(0.03, &grid).unwrap();
        let [p1, p2] = model.state_probability(2.0);
        let k = surfaces.total.num_time_nodes() - 1;
        assert_relative_eq!(surfaces.regime(Regime::First).value_at(0, k), 0.03 * p1, epsilon = 1e-14);
        assert_relative_eq!(surfaces.regime(Regime::Second).value_at(0, k), 0.03 * p2, epsilon = 1e-14);
    }

    #[test]
    fn test_put_call_parity_and_discounting() {
        let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let grid = grid(1.0, 31, 101);
        let curve = FlatCurve::new(0.02);
        let strikes = [0.02, 0.03, 0.05];
        let calls = pricer.price(0.03, &curve, &grid, &strikes, OptionType::Call).unwrap();
        let puts = pricer.price(0.03, &curve, &grid, &strikes, OptionType::Put).unwrap();
        let df = (-0.02_f64).exp();
        for (c, p) in calls.iter().zip(&puts) {
            assert_relative_eq!(c.price - p.price, df * (0.03 - c.strike), epsilon = 1e-12);
            assert_relative_eq!(p.dual_delta - c.dual_delta, df, epsilon = 1e-12);
            assert!(c.theta.is_some());
        }
    }

    #[test]
    fn test_grid_must_span_strikes() {
        let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let grid = grid(1.0, 11, 51);
        let err = pricer
            .price(0.03, &FlatCurve::new(0.0), &grid, &[0.5], OptionType::Call)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = pricer
            .price(0.31, &FlatCurve::new(0.0), &grid, &[0.03], OptionType::Call)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_strike_mesh_must_start_at_zero() {
        let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let time = UniformMesh::new(0.0, 1.0, 5).unwrap().generate().unwrap();
        let space = UniformMesh::new(0.01, 0.3, 31).unwrap().generate().unwrap();
        let grid = Arc::new(PdeGrid::new(time, space).unwrap());
        assert!(pricer.solve(0.03, &grid).is_err());
    }

    #[test]
    fn test_terminal_slice_has_no_theta() {
        let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
        let config = SolverConfig::builder()
            .storage(ResultsStorage::TerminalSlice)
            .build()
            .unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, config).unwrap();
        let quotes = pricer
            .price(0.03, &FlatCurve::new(0.0), &grid(1.0, 21, 81), &[0.03], OptionType::Call)
            .unwrap();
        assert!(quotes[0].theta.is_none());
    }

    #[test]
    fn test_spot_delta_matches_black_delta() {
        let model = TwoStateMarkovChain::new(0.3, 0.3, 1.0, 1.0, 0.5, 1.0, 1.0).unwrap();
        let pricer = TwoStateMarkovChainPricer::new(model, SolverConfig::default()).unwrap();
        let grid = grid(1.0, 81, 201);
        let sens = pricer
            .spot_sensitivities(0.03, &FlatCurve::new(0.0), &grid, &[0.03], OptionType::Call, 0.05)
            .unwrap();
        // ATM Black delta N(σ√T / 2).
        let expected = pricer_models::analytical::norm_cdf(0.15);
        assert_relative_eq!(sens[0].delta, expected, epsilon = 1e-2);
        assert!(sens[0].gamma > 0.0);
    }
}
