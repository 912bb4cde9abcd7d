//! Grid convergence of the theta-method solver.
//!
//! `u_t = u_xx` on `[0, π]` with `u = sin x` at expiry and zero Dirichlet
//! values has the exact solution `e^{-(T - t)} sin x`. Halving both the
//! space and time steps should cut the error by about four.

use std::f64::consts::PI;
use std::sync::Arc;

use pricer_core::math::grid::PdeGrid;
use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
use pricer_pricing::pde::{
    BoundaryCondition, PdeCoefficients, PdeProblem, SolverConfig, ThetaMethodSolver,
    TimeDirection,
};

const EXPIRY: f64 = 0.5;

fn max_error(space_points: usize, time_points: usize, config: SolverConfig) -> f64 {
    let time = UniformMesh::new(0.0, EXPIRY, time_points)
        .unwrap()
        .generate()
        .unwrap();
    let space = UniformMesh::new(0.0, PI, space_points)
        .unwrap()
        .generate()
        .unwrap();
    let grid = Arc::new(PdeGrid::new(time, space).unwrap());
    let problem = PdeProblem::from_fn(
        Arc::clone(&grid),
        PdeCoefficients::constant(1.0, 0.0, 0.0),
        f64::sin,
        BoundaryCondition::dirichlet(0.0, |_| 0.0),
        BoundaryCondition::dirichlet(PI, |_| 0.0),
    )
    .unwrap();
    let results = ThetaMethodSolver::new(config).solve(&problem).unwrap();

    let decay = (-EXPIRY).exp();
    grid.space_mesh()
        .nodes()
        .iter()
        .map(|&x| (results.interpolate(x, 0.0).unwrap() - decay * x.sin()).abs())
        .fold(0.0, f64::max)
}

#[test]
fn test_crank_nicolson_is_second_order() {
    let errors: Vec<f64> = [(21, 11), (41, 21), (81, 41)]
        .into_iter()
        .map(|(nx, nt)| max_error(nx, nt, SolverConfig::default()))
        .collect();

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(
            (3.5..4.5).contains(&ratio),
            "refinement ratio {ratio} from errors {errors:?}"
        );
    }
}

#[test]
fn test_fully_implicit_converges() {
    let config = SolverConfig::builder().theta(1.0).build().unwrap();
    let coarse = max_error(41, 21, config);
    let fine = max_error(41, 81, config);
    assert!(fine < coarse);
    assert!(fine < 5e-3);
}

#[test]
fn test_forward_direction_matches_backward() {
    // The problem is autonomous, so stepping forward from t = 0 for the same
    // length of time lands on the same values.
    let backward = max_error(41, 21, SolverConfig::default());
    let forward = SolverConfig::default().with_direction(TimeDirection::Forward);

    let time = UniformMesh::new(0.0, EXPIRY, 21).unwrap().generate().unwrap();
    let space = UniformMesh::new(0.0, PI, 41).unwrap().generate().unwrap();
    let grid = Arc::new(PdeGrid::new(time, space).unwrap());
    let problem = PdeProblem::from_fn(
        Arc::clone(&grid),
        PdeCoefficients::constant(1.0, 0.0, 0.0),
        f64::sin,
        BoundaryCondition::dirichlet(0.0, |_| 0.0),
        BoundaryCondition::dirichlet(PI, |_| 0.0),
    )
    .unwrap();
    let results = ThetaMethodSolver::new(forward).solve(&problem).unwrap();
    let decay = (-EXPIRY).exp();
    let error = grid
        .space_mesh()
        .nodes()
        .iter()
        .map(|&x| (results.interpolate(x, EXPIRY).unwrap() - decay * x.sin()).abs())
        .fold(0.0, f64::max);
    assert!((error - backward).abs() < 1e-12);
}
