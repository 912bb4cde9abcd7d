//! Theta-method time stepping for two linearly coupled equations
//!
//! ```text
//! ∂V_s/∂t = L_s V_s + Σ_r M[s][r] V_r,   s = 0, 1
//! ```
//!
//! Each step assembles one block-tridiagonal system whose 2x2 blocks carry
//! both states at a space node, so the coupling is treated with the same θ
//! as the spatial operators.

use std::sync::Arc;
use std::time::Instant;

use nalgebra::{Matrix2, Vector2};
use pricer_core::math::grid::PdeGrid;
use pricer_core::math::linalg::BlockTridiagonalSystem;
use tracing::{debug, trace, warn};

use super::boundary::BoundaryRow;
use super::boundary_2d::BoundaryCondition2D;
use super::budget::SolveBudget;
use super::coefficients::PdeCoefficients;
use super::config::{ResultsStorage, SolverConfig};
use super::error::PdeError;
use super::results::ResultsGrid;
use super::solver::{collect_results, operator_rows, traversal_order, validate_initial};

/// A two-state problem on one grid.
///
/// The boundary conditions are evaluated with `y` equal to the state index
/// (`0.0` or `1.0`).
#[derive(Debug, Clone)]
pub struct CoupledPdeProblem {
    grid: Arc<PdeGrid>,
    coefficients: [PdeCoefficients; 2],
    coupling: [[f64; 2]; 2],
    initial_conditions: [Vec<f64>; 2],
    lower: BoundaryCondition2D,
    upper: BoundaryCondition2D,
}

impl CoupledPdeProblem {
    /// Assemble and validate a problem.
    ///
    /// `coupling[s][r]` multiplies `V_r` in the equation for `V_s`.
    ///
    /// # Errors
    ///
    /// `PdeError::Configuration` for a non-finite coupling, an initial
    /// condition of the wrong length or with non-finite values, or a
    /// boundary level off the mesh edge.
    pub fn new(
        grid: Arc<PdeGrid>,
        coefficients: [PdeCoefficients; 2],
        coupling: [[f64; 2]; 2],
        initial_conditions: [Vec<f64>; 2],
        lower: BoundaryCondition2D,
        upper: BoundaryCondition2D,
    ) -> Result<Self, PdeError> {
        let problem = Self {
            grid,
            coefficients,
            coupling,
            initial_conditions,
            lower,
            upper,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Grid shared by both states.
    pub fn grid(&self) -> &Arc<PdeGrid> {
        &self.grid
    }

    /// Operator coefficients of state `s`.
    pub fn coefficients(&self, s: usize) -> &PdeCoefficients {
        &self.coefficients[s]
    }

    /// Coupling matrix.
    pub fn coupling(&self) -> [[f64; 2]; 2] {
        self.coupling
    }

    /// Starting slice of state `s`.
    pub fn initial_condition(&self, s: usize) -> &[f64] {
        &self.initial_conditions[s]
    }

    /// Condition at `x_min`.
    pub fn lower(&self) -> &BoundaryCondition2D {
        &self.lower
    }

    /// Condition at `x_max`.
    pub fn upper(&self) -> &BoundaryCondition2D {
        &self.upper
    }

    /// Re-check every invariant of the problem.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn validate(&self) -> Result<(), PdeError> {
        if self.coupling.iter().flatten().any(|m| !m.is_finite()) {
            return Err(PdeError::configuration("coupling matrix must be finite"));
        }
        validate_initial(&self.grid, &self.initial_conditions[0], "initial condition of state 0")?;
        validate_initial(&self.grid, &self.initial_conditions[1], "initial condition of state 1")?;
        let space = self.grid.space_mesh();
        self.lower.validate_level(space.start(), "lower")?;
        self.upper.validate_level(space.end(), "upper")?;
        Ok(())
    }
}

/// Theta-method solver for [`CoupledPdeProblem`]s.
#[derive(Debug, Clone, Default)]
pub struct CoupledThetaSolver {
    config: SolverConfig,
}

impl CoupledThetaSolver {
    /// Solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve without limits, returning one surface per state.
    ///
    /// # Errors
    ///
    /// See [`solve_with_budget`](Self::solve_with_budget).
    pub fn solve(&self, problem: &CoupledPdeProblem) -> Result<[ResultsGrid; 2], PdeError> {
        self.solve_with_budget(problem, &SolveBudget::unlimited())
    }

    /// Solve, checking `budget` once per time step.
    ///
    /// # Errors
    ///
    /// - `PdeError::Configuration` for an invalid configuration or problem
    /// - `PdeError::Numerical` if a pivot block is singular
    /// - `PdeError::NonFinite` if a coefficient or boundary value is not finite
    /// - `PdeError::Cancelled` if the budget runs out
    pub fn solve_with_budget(
        &self,
        problem: &CoupledPdeProblem,
        budget: &SolveBudget,
    ) -> Result<[ResultsGrid; 2], PdeError> {
        self.config.validate()?;
        problem.validate()?;

        let grid = problem.grid();
        let n = grid.num_space_nodes();
        let order = traversal_order(grid, self.config.direction());
        let steps = order.len() - 1;
        let coupling = Matrix2::new(
            problem.coupling[0][0],
            problem.coupling[0][1],
            problem.coupling[1][0],
            problem.coupling[1][1],
        );
        let started = Instant::now();

        debug!(
            space_nodes = n,
            time_steps = steps,
            theta = self.config.theta(),
            direction = ?self.config.direction(),
            "starting coupled theta-method solve"
        );

        let keep_history = self.config.storage() == ResultsStorage::Full;
        let mut history: [Vec<Vec<f64>>; 2] = [Vec::new(), Vec::new()];
        let mut values: Vec<Vector2<f64>> = (0..n)
            .map(|i| {
                Vector2::new(
                    problem.initial_conditions[0][i],
                    problem.initial_conditions[1][i],
                )
            })
            .collect();
        let mut system = BlockTridiagonalSystem::new(n);
        let mut rows_cur = [vec![[0.0; 3]; n], vec![[0.0; 3]; n]];
        let mut rows_next = [vec![[0.0; 3]; n], vec![[0.0; 3]; n]];

        let t_start = grid.time_node(order[0]);
        for s in 0..2 {
            operator_rows(&problem.coefficients[s], grid, t_start, 0, &mut rows_cur[s])?;
        }

        for step in 0..steps {
            if let Err(err) = budget.check(step, started) {
                warn!(step, error = %err, "coupled solve cancelled");
                return Err(err);
            }

            let t_next = grid.time_node(order[step + 1]);
            let dt = (t_next - grid.time_node(order[step])).abs();
            let theta = self.config.theta_for_step(step);
            for s in 0..2 {
                operator_rows(&problem.coefficients[s], grid, t_next, step, &mut rows_next[s])?;
            }

            for i in 1..n - 1 {
                let mut explicit = coupling * values[i];
                let mut lower = Matrix2::zeros();
                let mut diag = Matrix2::identity() - coupling * (theta * dt);
                let mut upper = Matrix2::zeros();
                for s in 0..2 {
                    let [lc, dc, uc] = rows_cur[s][i];
                    explicit[s] += lc * values[i - 1][s] + dc * values[i][s] + uc * values[i + 1][s];
                    let [ln, dn, un] = rows_next[s][i];
                    lower[(s, s)] = -theta * dt * ln;
                    diag[(s, s)] -= theta * dt * dn;
                    upper[(s, s)] = -theta * dt * un;
                }
                let rhs = values[i] + explicit * ((1.0 - theta) * dt);
                system.set_row(i, lower, diag, upper, rhs);
            }

            self.set_boundary_rows(problem, &mut system, t_next, step)?;

            let solution = system.solve().map_err(|source| {
                warn!(step, t = t_next, error = %source, "block solve failed");
                PdeError::Numerical {
                    step,
                    time: t_next,
                    source,
                }
            })?;

            if keep_history {
                for (s, states) in history.iter_mut().enumerate() {
                    states.push(values.iter().map(|v| v[s]).collect());
                }
            }
            values.copy_from_slice(solution);
            std::mem::swap(&mut rows_cur, &mut rows_next);
            trace!(step, t = t_next, theta, "coupled step complete");
        }

        debug!(
            steps,
            elapsed_us = started.elapsed().as_micros() as u64,
            "coupled theta-method solve finished"
        );

        let [first, second] = history;
        let last_first: Vec<f64> = values.iter().map(|v| v[0]).collect();
        let last_second: Vec<f64> = values.iter().map(|v| v[1]).collect();
        Ok([
            collect_results(grid, &self.config, &order, first, last_first),
            collect_results(grid, &self.config, &order, second, last_second),
        ])
    }

    fn set_boundary_rows(
        &self,
        problem: &CoupledPdeProblem,
        system: &mut BlockTridiagonalSystem,
        t: f64,
        step: usize,
    ) -> Result<(), PdeError> {
        let grid = problem.grid();
        let n = grid.num_space_nodes();
        let coefficients = &problem.coefficients[0];

        let boundary_values = |bc: &BoundaryCondition2D| -> Result<Vector2<f64>, PdeError> {
            let v = Vector2::new(bc.constant(coefficients, t, 0.0), bc.constant(coefficients, t, 1.0));
            if v.iter().all(|c| c.is_finite()) {
                Ok(v)
            } else {
                warn!(step, t, "non-finite boundary value");
                Err(PdeError::NonFinite {
                    what: "boundary value",
                    step,
                    time: t,
                })
            }
        };

        let eye = Matrix2::<f64>::identity();
        let zero = Matrix2::<f64>::zeros();

        let rhs = boundary_values(&problem.lower)?;
        match problem.lower.left_row(coefficients, grid, t) {
            BoundaryRow::Single([c]) => system.set_row(0, zero, eye * c, zero, rhs),
            BoundaryRow::Pair([c0, c1]) => system.set_row(0, zero, eye * c0, eye * c1, rhs),
        }

        let rhs = boundary_values(&problem.upper)?;
        match problem.upper.right_row(coefficients, grid, t) {
            BoundaryRow::Single([c]) => system.set_row(n - 1, zero, eye * c, zero, rhs),
            BoundaryRow::Pair([c0, c1]) => system.set_row(n - 1, eye * c0, eye * c1, zero, rhs),
        }
        Ok(())
    }
}
