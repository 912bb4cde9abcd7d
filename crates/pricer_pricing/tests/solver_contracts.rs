//! Behavioural contracts of the solvers and pricers: repeatability,
//! exactness at nodes, cancellation and term-structure discounting.

use std::sync::Arc;
use std::time::Duration;

use pricer_core::market_data::{CurveInterpolation, FlatCurve, InterpolatedCurve, YieldCurve};
use pricer_core::math::grid::PdeGrid;
use pricer_core::math::meshing::{ExponentialMesh, HyperbolicMesh, MeshGenerator, UniformMesh};
use pricer_models::instruments::OptionType;
use pricer_models::models::TwoStateMarkovChain;
use pricer_pricing::pde::{
    BoundaryCondition, CancelReason, CancellationToken, ErrorKind, PdeCoefficients, PdeError,
    PdeProblem, SolveBudget, SolverConfig, ThetaMethodSolver,
};
use pricer_pricing::pricer::{CevPdePricer, TwoStateMarkovChainPricer};

fn regime_grid() -> Arc<PdeGrid> {
    let time = ExponentialMesh::new(0.0, 2.0, 31, 5.0)
        .unwrap()
        .generate()
        .unwrap();
    let space = HyperbolicMesh::new(0.0, 0.3, 0.03, 121, 0.01)
        .unwrap()
        .generate()
        .unwrap();
    Arc::new(PdeGrid::new(time, space).unwrap())
}

fn model() -> TwoStateMarkovChain {
    TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 0.8, 0.7, 1.0).unwrap()
}

#[test]
fn test_repeated_and_concurrent_solves_are_identical() {
    let grid = regime_grid();
    let pricer = TwoStateMarkovChainPricer::new(model(), SolverConfig::default()).unwrap();

    let first = pricer.solve(0.03, &grid).unwrap();
    let (second, third) = rayon::join(
        || pricer.solve(0.03, &grid).unwrap(),
        || pricer.solve(0.03, &grid).unwrap(),
    );
    for other in [&second, &third] {
        for k in 0..first.total.num_time_nodes() {
            assert_eq!(first.total.slice(k), other.total.slice(k));
        }
    }
}

#[test]
fn test_interpolation_is_exact_at_nodes() {
    let grid = regime_grid();
    let pricer = TwoStateMarkovChainPricer::new(model(), SolverConfig::default()).unwrap();
    let surfaces = pricer.solve(0.03, &grid).unwrap();
    let total = &surfaces.total;

    for k in [0, 7, total.num_time_nodes() - 1] {
        let t = grid.time_node(k);
        for i in (0..total.num_space_nodes()).step_by(10) {
            let x = grid.space_node(i);
            assert_eq!(total.interpolate(x, t).unwrap(), total.value_at(i, k));
        }
    }
}

#[test]
fn test_queries_outside_the_grid_are_domain_errors() {
    let grid = regime_grid();
    let pricer = TwoStateMarkovChainPricer::new(model(), SolverConfig::default()).unwrap();
    let surfaces = pricer.solve(0.03, &grid).unwrap();

    let err = surfaces.total.interpolate(0.31, 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    let err = surfaces.total.interpolate(0.03, 2.5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);

    let extrapolated = surfaces.total.interpolate_extrapolating(0.31, 1.0).unwrap();
    assert!(extrapolated.is_finite());
}

#[test]
fn test_step_limit_cancels_solve() {
    let grid = regime_grid();
    let pricer = TwoStateMarkovChainPricer::new(model(), SolverConfig::default()).unwrap();
    let budget = SolveBudget::unlimited().with_max_steps(5);

    let err = pricer.solve_with_budget(0.03, &grid, &budget).unwrap_err();
    assert_eq!(
        err,
        PdeError::Cancelled {
            completed_steps: 5,
            reason: CancelReason::StepLimit
        }
    );
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(!err.is_retryable());
}

#[test]
fn test_cancellation_token_is_shared() {
    let time = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
    let space = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
    let grid = Arc::new(PdeGrid::new(time, space).unwrap());
    let problem = PdeProblem::from_fn(
        grid,
        PdeCoefficients::constant(1.0, 0.0, 0.0),
        |x| x * (1.0 - x),
        BoundaryCondition::dirichlet(0.0, |_| 0.0),
        BoundaryCondition::dirichlet(1.0, |_| 0.0),
    )
    .unwrap();

    let token = CancellationToken::new();
    let budget = SolveBudget::unlimited()
        .with_cancellation(token.clone())
        .with_max_duration(Duration::from_secs(60));
    let solver = ThetaMethodSolver::default();
    assert!(solver.solve_with_budget(&problem, &budget).is_ok());

    token.cancel();
    match solver.solve_with_budget(&problem, &budget) {
        Err(PdeError::Cancelled { reason, .. }) => assert_eq!(reason, CancelReason::Requested),
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[test]
fn test_cev_discounts_with_term_structure() {
    let curve = InterpolatedCurve::new(
        &[0.5, 1.0, 2.0],
        &[0.01, 0.02, 0.04],
        CurveInterpolation::Linear,
        true,
    )
    .unwrap();
    let time = UniformMesh::new(0.0, 2.0, 201).unwrap().generate().unwrap();
    let space = HyperbolicMesh::new(0.0, 500.0, 100.0, 241, 0.1)
        .unwrap()
        .generate()
        .unwrap();
    let grid = Arc::new(PdeGrid::new(time, space).unwrap());

    let pricer = CevPdePricer::new(0.25, 1.0, SolverConfig::default()).unwrap();
    for option in [OptionType::Call, OptionType::Put] {
        let pde = pricer.price(100.0, 105.0, &curve, &grid, option).unwrap();
        let exact = pricer.black_reference(100.0, 105.0, 2.0, &curve, option).unwrap();
        assert!(
            (pde - exact).abs() < 0.05,
            "{option}: PDE {pde} vs Black {exact}"
        );
    }

    // Parity against the curve's own discount factor.
    let call = pricer.price(100.0, 105.0, &curve, &grid, OptionType::Call).unwrap();
    let put = pricer.price(100.0, 105.0, &curve, &grid, OptionType::Put).unwrap();
    let df = curve.discount_factor(2.0).unwrap();
    assert!((call - put - (100.0 - 105.0 * df)).abs() < 1e-2);
}

#[test]
fn test_regime_prices_are_discounted() {
    let grid = regime_grid();
    let pricer = TwoStateMarkovChainPricer::new(model(), SolverConfig::default()).unwrap();
    let strikes = [0.02, 0.03, 0.04];
    let undiscounted = pricer
        .price(0.03, &FlatCurve::new(0.0), &grid, &strikes, OptionType::Call)
        .unwrap();
    let discounted = pricer
        .price(0.03, &FlatCurve::new(0.05), &grid, &strikes, OptionType::Call)
        .unwrap();
    let df = (-0.05_f64 * 2.0).exp();
    for (u, d) in undiscounted.iter().zip(&discounted) {
        assert!((d.price - df * u.price).abs() < 1e-14);
        assert!(d.theta.is_some());
    }
}
