//! Theta-method time stepping for a single parabolic equation.
//!
//! Each step from `t_cur` to `t_next` (in the configured direction, with
//! `Δt = |t_next - t_cur|`) solves
//!
//! ```text
//! (I - θ Δt L(t_next)) V_next = (I + (1 - θ) Δt L(t_cur)) V_cur
//! ```
//!
//! on the interior nodes, with the first and last rows replaced by the
//! boundary conditions evaluated at `t_next`. `L` is discretised with the
//! three-point non-uniform stencils precomputed by [`PdeGrid`].

use std::sync::Arc;
use std::time::Instant;

use pricer_core::math::grid::PdeGrid;
use pricer_core::math::linalg::TridiagonalSystem;
use tracing::{debug, trace, warn};

use super::boundary::{BoundaryCondition, BoundaryRow};
use super::budget::SolveBudget;
use super::coefficients::PdeCoefficients;
use super::config::{ResultsStorage, SolverConfig, TimeDirection};
use super::error::PdeError;
use super::results::ResultsGrid;

/// A fully specified one-dimensional problem.
///
/// The initial condition is the slice at the first time visited by the
/// solve: `t_min` for forward solves, `t_max` (the payoff) for backward ones.
#[derive(Debug, Clone)]
pub struct PdeProblem {
    grid: Arc<PdeGrid>,
    coefficients: PdeCoefficients,
    initial_condition: Vec<f64>,
    lower: BoundaryCondition,
    upper: BoundaryCondition,
}

impl PdeProblem {
    /// Assemble and validate a problem.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` if the initial condition has the wrong
    /// length or a non-finite value, or if a boundary level does not sit on
    /// the matching edge of the space mesh.
    pub fn new(
        grid: Arc<PdeGrid>,
        coefficients: PdeCoefficients,
        initial_condition: Vec<f64>,
        lower: BoundaryCondition,
        upper: BoundaryCondition,
    ) -> Result<Self, PdeError> {
        let problem = Self {
            grid,
            coefficients,
            initial_condition,
            lower,
            upper,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// As [`new`](Self::new), sampling the initial condition from `f(x)`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_fn<F>(
        grid: Arc<PdeGrid>,
        coefficients: PdeCoefficients,
        initial: F,
        lower: BoundaryCondition,
        upper: BoundaryCondition,
    ) -> Result<Self, PdeError>
    where
        F: Fn(f64) -> f64,
    {
        let values = grid.space_mesh().nodes().iter().map(|&x| initial(x)).collect();
        Self::new(grid, coefficients, values, lower, upper)
    }

    /// Grid shared by the problem.
    pub fn grid(&self) -> &Arc<PdeGrid> {
        &self.grid
    }

    /// Operator coefficients.
    pub fn coefficients(&self) -> &PdeCoefficients {
        &self.coefficients
    }

    /// Starting slice.
    pub fn initial_condition(&self) -> &[f64] {
        &self.initial_condition
    }

    /// Condition at `x_min`.
    pub fn lower(&self) -> &BoundaryCondition {
        &self.lower
    }

    /// Condition at `x_max`.
    pub fn upper(&self) -> &BoundaryCondition {
        &self.upper
    }

    /// Re-check every invariant of the problem.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<(), PdeError> {
        validate_initial(&self.grid, &self.initial_condition, "initial condition")?;
        let space = self.grid.space_mesh();
        self.lower.validate_level(space.start(), "lower")?;
        self.upper.validate_level(space.end(), "upper")?;
        Ok(())
    }
}

pub(crate) fn validate_initial(grid: &PdeGrid, values: &[f64], what: &str) -> Result<(), PdeError> {
    if values.len() != grid.num_space_nodes() {
        return Err(PdeError::configuration(format!(
            "{what} has {} values for {} space nodes",
            values.len(),
            grid.num_space_nodes()
        )));
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(PdeError::configuration(format!(
            "{what} is not finite at node {index}"
        )));
    }
    Ok(())
}

/// Time indices in traversal order.
pub(crate) fn traversal_order(grid: &PdeGrid, direction: TimeDirection) -> Vec<usize> {
    let m = grid.num_time_nodes();
    match direction {
        TimeDirection::Forward => (0..m).collect(),
        TimeDirection::Backward => (0..m).rev().collect(),
    }
}

/// Discrete operator rows `[l, d, u]` of `L(t)` at every interior node.
///
/// Entries for the two boundary nodes are left untouched.
pub(crate) fn operator_rows(
    coefficients: &PdeCoefficients,
    grid: &PdeGrid,
    t: f64,
    step: usize,
    rows: &mut [[f64; 3]],
) -> Result<(), PdeError> {
    let n = grid.num_space_nodes();
    for (i, row) in rows.iter_mut().enumerate().take(n - 1).skip(1) {
        let x = grid.space_node(i);
        let a = coefficients.diffusion(x, t);
        let b = coefficients.convection(x, t);
        let c = coefficients.reaction(x, t);
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(PdeError::NonFinite {
                what: "operator coefficient",
                step,
                time: t,
            });
        }
        let s = grid.stencil(i);
        *row = [
            a * s.second[0] + b * s.first[0],
            a * s.second[1] + b * s.first[1] + c,
            a * s.second[2] + b * s.first[2],
        ];
    }
    Ok(())
}

/// Package traversal-ordered slices as a [`ResultsGrid`].
pub(crate) fn collect_results(
    grid: &Arc<PdeGrid>,
    config: &SolverConfig,
    order: &[usize],
    mut history: Vec<Vec<f64>>,
    last: Vec<f64>,
) -> ResultsGrid {
    let (time_nodes, slices, terminal_index) = match config.storage() {
        ResultsStorage::Full => {
            let mut times: Vec<f64> = order.iter().map(|&k| grid.time_node(k)).collect();
            history.push(last);
            if config.direction() == TimeDirection::Backward {
                times.reverse();
                history.reverse();
                (times, history, 0)
            } else {
                let terminal = times.len() - 1;
                (times, history, terminal)
            }
        }
        ResultsStorage::TerminalSlice => {
            let t = grid.time_node(order[order.len() - 1]);
            (vec![t], vec![last], 0)
        }
    };
    ResultsGrid::from_slices(
        Arc::clone(grid),
        time_nodes,
        slices,
        config.storage(),
        terminal_index,
        config.interpolation(),
    )
}

/// Theta-method solver for [`PdeProblem`]s.
///
/// The solver holds only its configuration; every solve allocates its own
/// buffers, so one solver may serve concurrent solves.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pricer_core::math::grid::PdeGrid;
/// use pricer_core::math::meshing::{MeshGenerator, UniformMesh};
/// use pricer_pricing::pde::{
///     BoundaryCondition, PdeCoefficients, PdeProblem, SolverConfig, ThetaMethodSolver,
///     TimeDirection,
/// };
///
/// // u_t = u_xx on [0, π] with u(x, 0) = sin x
/// let pi = std::f64::consts::PI;
/// let time = UniformMesh::new(0.0, 0.5, 51).unwrap().generate().unwrap();
/// let space = UniformMesh::new(0.0, pi, 101).unwrap().generate().unwrap();
/// let grid = Arc::new(PdeGrid::new(time, space).unwrap());
///
/// let problem = PdeProblem::from_fn(
///     grid,
///     PdeCoefficients::constant(1.0, 0.0, 0.0),
///     f64::sin,
///     BoundaryCondition::dirichlet(0.0, |_| 0.0),
///     BoundaryCondition::dirichlet(pi, |_| 0.0),
/// )
/// .unwrap();
///
/// let config = SolverConfig::builder().direction(TimeDirection::Forward).build().unwrap();
/// let results = ThetaMethodSolver::new(config).solve(&problem).unwrap();
///
/// let u = results.interpolate(pi / 2.0, 0.5).unwrap();
/// assert!((u - (-0.5_f64).exp()).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThetaMethodSolver {
    config: SolverConfig,
}

impl ThetaMethodSolver {
    /// Solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve without limits.
    ///
    /// # Errors
    ///
    /// See [`solve_with_budget`](Self::solve_with_budget).
    pub fn solve(&self, problem: &PdeProblem) -> Result<ResultsGrid, PdeError> {
        self.solve_with_budget(problem, &SolveBudget::unlimited())
    }

    /// Solve, checking `budget` once per time step.
    ///
    /// # Errors
    ///
    /// - `PdeError::Configuration` for an invalid configuration or problem,
    ///   raised before the first step
    /// - `PdeError::Numerical` or `PdeError::NonFinite` if a step breaks down
    /// - `PdeError::Cancelled` if the budget runs out
    pub fn solve_with_budget(
        &self,
        problem: &PdeProblem,
        budget: &SolveBudget,
    ) -> Result<ResultsGrid, PdeError> {
        self.config.validate()?;
        problem.validate()?;

        let grid = problem.grid();
        let coefficients = problem.coefficients();
        let n = grid.num_space_nodes();
        let order = traversal_order(grid, self.config.direction());
        let steps = order.len() - 1;
        let started = Instant::now();

        debug!(
            space_nodes = n,
            time_steps = steps,
            theta = self.config.theta(),
            direction = ?self.config.direction(),
            "starting theta-method solve"
        );

        let keep_history = self.config.storage() == ResultsStorage::Full;
        let mut history = Vec::with_capacity(if keep_history { steps } else { 0 });
        let mut values = problem.initial_condition().to_vec();
        let mut system = TridiagonalSystem::new(n);
        let mut rows_cur = vec![[0.0; 3]; n];
        let mut rows_next = vec![[0.0; 3]; n];

        operator_rows(coefficients, grid, grid.time_node(order[0]), 0, &mut rows_cur)?;

        for step in 0..steps {
            if let Err(err) = budget.check(step, started) {
                warn!(step, error = %err, "solve cancelled");
                return Err(err);
            }

            let t_next = grid.time_node(order[step + 1]);
            let dt = (t_next - grid.time_node(order[step])).abs();
            let theta = self.config.theta_for_step(step);
            operator_rows(coefficients, grid, t_next, step, &mut rows_next)?;

            for i in 1..n - 1 {
                let [lc, dc, uc] = rows_cur[i];
                let explicit = lc * values[i - 1] + dc * values[i] + uc * values[i + 1];
                let [ln, dn, un] = rows_next[i];
                system.set_row(
                    i,
                    -theta * dt * ln,
                    1.0 - theta * dt * dn,
                    -theta * dt * un,
                    values[i] + (1.0 - theta) * dt * explicit,
                );
            }

            let lower = problem.lower();
            let upper = problem.upper();
            let lower_value = lower.constant(coefficients, grid, t_next);
            let upper_value = upper.constant(coefficients, grid, t_next);
            if !(lower_value.is_finite() && upper_value.is_finite()) {
                warn!(step, t = t_next, "non-finite boundary value");
                return Err(PdeError::NonFinite {
                    what: "boundary value",
                    step,
                    time: t_next,
                });
            }
            match lower.left_row(coefficients, grid, t_next) {
                BoundaryRow::Single([c]) => system.set_row(0, 0.0, c, 0.0, lower_value),
                BoundaryRow::Pair([c0, c1]) => system.set_row(0, 0.0, c0, c1, lower_value),
            }
            match upper.right_row(coefficients, grid, t_next) {
                BoundaryRow::Single([c]) => system.set_row(n - 1, 0.0, c, 0.0, upper_value),
                BoundaryRow::Pair([c0, c1]) => system.set_row(n - 1, c0, c1, 0.0, upper_value),
            }

            let solution = system.solve().map_err(|source| {
                warn!(step, t = t_next, error = %source, "linear solve failed");
                PdeError::Numerical {
                    step,
                    time: t_next,
                    source,
                }
            })?;

            if keep_history {
                history.push(std::mem::replace(&mut values, solution.to_vec()));
            } else {
                values.copy_from_slice(solution);
            }
            std::mem::swap(&mut rows_cur, &mut rows_next);
            trace!(step, t = t_next, theta, "step complete");
        }

        debug!(
            steps,
            elapsed_us = started.elapsed().as_micros() as u64,
            "theta-method solve finished"
        );
        Ok(collect_results(grid, &self.config, &order, history, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pde::{CancellationToken, ErrorKind};
    use approx::assert_relative_eq;
    use pricer_core::math::meshing::{MeshGenerator, UniformMesh};

    fn heat_problem(nx: usize, nt: usize) -> PdeProblem {
        let pi = std::f64::consts::PI;
        let time = UniformMesh::new(0.0, 0.5, nt).unwrap().generate().unwrap();
        let space = UniformMesh::new(0.0, pi, nx).unwrap().generate().unwrap();
        let grid = Arc::new(PdeGrid::new(time, space).unwrap());
        PdeProblem::from_fn(
            grid,
            PdeCoefficients::constant(1.0, 0.0, 0.0),
            f64::sin,
            BoundaryCondition::dirichlet(0.0, |_| 0.0),
            BoundaryCondition::dirichlet(pi, |_| 0.0),
        )
        .unwrap()
    }

    fn forward() -> SolverConfig {
        SolverConfig::builder()
            .direction(TimeDirection::Forward)
            .build()
            .unwrap()
    }

    #[test]
    fn test_heat_equation_accuracy() {
        let problem = heat_problem(161, 81);
        let results = ThetaMethodSolver::new(forward()).solve(&problem).unwrap();
        assert_eq!(results.num_time_nodes(), 81);
        for (i, &x) in results.space_nodes().iter().enumerate() {
            let exact = (-0.5_f64).exp() * x.sin();
            assert_relative_eq!(results.value_at(i, 80), exact, epsilon = 5e-4);
        }
    }

    #[test]
    fn test_backward_matches_forward_for_autonomous_problem() {
        let problem = heat_problem(41, 21);
        let fwd = ThetaMethodSolver::new(forward()).solve(&problem).unwrap();
        let bwd = ThetaMethodSolver::new(SolverConfig::default())
            .solve(&problem)
            .unwrap();
        // Uniform time mesh: both directions take identical steps.
        let forward_last = fwd.terminal_slice();
        let backward_last = bwd.terminal_slice();
        for (a, b) in forward_last.iter().zip(&backward_last) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
        assert_eq!(bwd.terminal_time(), 0.0);
        assert_eq!(fwd.terminal_time(), 0.5);
    }

    #[test]
    fn test_terminal_slice_storage() {
        let problem = heat_problem(41, 21);
        let config = forward().with_storage(ResultsStorage::TerminalSlice);
        let results = ThetaMethodSolver::new(config).solve(&problem).unwrap();
        assert_eq!(results.time_nodes(), &[0.5]);
    }

    #[test]
    fn test_neumann_boundary_linear_steady_state() {
        // u_t = u_xx with u(0) = 1 and u_x(1) = 2 has the steady state 1 + 2x,
        // which the scheme reproduces exactly.
        let time = UniformMesh::new(0.0, 1.0, 11).unwrap().generate().unwrap();
        let space = UniformMesh::new(0.0, 1.0, 21).unwrap().generate().unwrap();
        let grid = Arc::new(PdeGrid::new(time, space).unwrap());
        let problem = PdeProblem::from_fn(
            grid,
            PdeCoefficients::constant(1.0, 0.0, 0.0),
            |x| 1.0 + 2.0 * x,
            BoundaryCondition::dirichlet(0.0, |_| 1.0),
            BoundaryCondition::neumann(1.0, |_| 2.0),
        )
        .unwrap();
        let results = ThetaMethodSolver::new(forward()).solve(&problem).unwrap();
        for (i, &x) in results.space_nodes().iter().enumerate() {
            assert_relative_eq!(results.value_at(i, 10), 1.0 + 2.0 * x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_misplaced_boundary_rejected() {
        let problem = heat_problem(11, 5);
        let result = PdeProblem::new(
            Arc::clone(problem.grid()),
            problem.coefficients().clone(),
            problem.initial_condition().to_vec(),
            BoundaryCondition::dirichlet(0.1, |_| 0.0),
            problem.upper().clone(),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_non_finite_coefficient_is_numerical() {
        let problem = heat_problem(11, 5);
        let bad = PdeProblem::new(
            Arc::clone(problem.grid()),
            PdeCoefficients::new(|x, _| if x > 1.0 { f64::NAN } else { 1.0 }, |_, _| 0.0, |_, _| 0.0),
            problem.initial_condition().to_vec(),
            problem.lower().clone(),
            problem.upper().clone(),
        )
        .unwrap();
        let err = ThetaMethodSolver::new(forward()).solve(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_singular_system_reports_step() {
        // c = 1/Δt makes the implicit diagonal vanish at every interior node.
        let problem = heat_problem(11, 5);
        let dt = problem.grid().time_step(0);
        let bad = PdeProblem::new(
            Arc::clone(problem.grid()),
            PdeCoefficients::constant(0.0, 0.0, 1.0 / dt),
            problem.initial_condition().to_vec(),
            problem.lower().clone(),
            problem.upper().clone(),
        )
        .unwrap();
        let config = SolverConfig::builder()
            .theta(1.0)
            .direction(TimeDirection::Forward)
            .build()
            .unwrap();
        match ThetaMethodSolver::new(config).solve(&bad) {
            Err(PdeError::Numerical { step, .. }) => assert_eq!(step, 0),
            other => panic!("expected numerical error, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_before_first_step() {
        let problem = heat_problem(11, 5);
        let token = CancellationToken::new();
        token.cancel();
        let budget = SolveBudget::unlimited().with_cancellation(token);
        let err = ThetaMethodSolver::new(forward())
            .solve_with_budget(&problem, &budget)
            .unwrap_err();
        assert_eq!(
            err,
            PdeError::Cancelled {
                completed_steps: 0,
                reason: crate::pde::CancelReason::Requested
            }
        );
    }
}
