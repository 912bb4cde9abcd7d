//! Thomas algorithm for tridiagonal systems.

use crate::math::SINGULARITY_THRESHOLD;
use crate::types::LinearSolveError;

/// Tridiagonal system `A x = d` with owned band storage.
///
/// Row `i` reads `lower[i] x[i-1] + diag[i] x[i] + upper[i] x[i+1] = rhs[i]`.
/// `lower[0]` and `upper[n-1]` are ignored.
///
/// # Example
///
/// ```
/// use pricer_core::math::linalg::TridiagonalSystem;
///
/// let mut system = TridiagonalSystem::new(3);
/// system.set_row(0, 0.0, 2.0, 1.0, 3.0);
/// system.set_row(1, 1.0, 2.0, 1.0, 4.0);
/// system.set_row(2, 1.0, 2.0, 0.0, 3.0);
///
/// let x = system.solve().unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 1.0).abs() < 1e-12);
/// assert!((x[2] - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    rhs: Vec<f64>,
    c_prime: Vec<f64>,
    solution: Vec<f64>,
}

impl TridiagonalSystem {
    /// Allocate a zeroed system with `n` rows.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            rhs: vec![0.0; n],
            c_prime: vec![0.0; n],
            solution: vec![0.0; n],
        }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// Whether the system has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Overwrite row `i`.
    #[inline]
    pub fn set_row(&mut self, i: usize, lower: f64, diag: f64, upper: f64, rhs: f64) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
        self.rhs[i] = rhs;
    }

    /// Solve in place and return the solution.
    ///
    /// The band storage is left untouched, so the same system can be solved
    /// again after changing only some rows.
    ///
    /// # Errors
    ///
    /// - `LinearSolveError::SingularPivot` if an eliminated pivot is smaller
    ///   in magnitude than [`SINGULARITY_THRESHOLD`]
    /// - `LinearSolveError::NonFinite` if the solution contains NaN or infinity
    pub fn solve(&mut self) -> Result<&[f64], LinearSolveError> {
        let n = self.diag.len();
        if n == 0 {
            return Ok(&self.solution);
        }

        let x = &mut self.solution;
        let cp = &mut self.c_prime;

        let mut pivot = self.diag[0];
        if pivot.abs() < SINGULARITY_THRESHOLD {
            return Err(LinearSolveError::SingularPivot { row: 0, pivot });
        }
        cp[0] = self.upper[0] / pivot;
        x[0] = self.rhs[0] / pivot;

        // Forward sweep
        for i in 1..n {
            pivot = self.diag[i] - self.lower[i] * cp[i - 1];
            if pivot.abs() < SINGULARITY_THRESHOLD || !pivot.is_finite() {
                return Err(LinearSolveError::SingularPivot { row: i, pivot });
            }
            cp[i] = self.upper[i] / pivot;
            x[i] = (self.rhs[i] - self.lower[i] * x[i - 1]) / pivot;
        }

        // Back substitution
        for i in (0..n - 1).rev() {
            x[i] -= cp[i] * x[i + 1];
        }

        if let Some(row) = x.iter().position(|v| !v.is_finite()) {
            return Err(LinearSolveError::NonFinite { row });
        }
        Ok(&self.solution)
    }
}

/// Solve a tridiagonal system given as separate bands.
///
/// `lower` and `upper` have `n - 1` entries, `diag` and `rhs` have `n`.
///
/// # Errors
///
/// - `LinearSolveError::DimensionMismatch` if band lengths are inconsistent
/// - Any error from [`TridiagonalSystem::solve`]
pub fn solve_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, LinearSolveError> {
    let n = diag.len();
    for len in [rhs.len(), lower.len() + 1, upper.len() + 1] {
        if len != n {
            return Err(LinearSolveError::DimensionMismatch {
                expected: n,
                got: len,
            });
        }
    }

    let mut system = TridiagonalSystem::new(n);
    for i in 0..n {
        let l = if i > 0 { lower[i - 1] } else { 0.0 };
        let u = if i + 1 < n { upper[i] } else { 0.0 };
        system.set_row(i, l, diag[i], u, rhs[i]);
    }
    system.solve().map(<[f64]>::to_vec)
}
