//! Block Thomas algorithm for tridiagonal systems of 2x2 blocks.

use nalgebra::{Matrix2, Vector2};

use crate::math::SINGULARITY_THRESHOLD;
use crate::types::LinearSolveError;

/// Block tridiagonal system with 2x2 blocks and owned storage.
///
/// Block row `i` reads `A[i] x[i-1] + B[i] x[i] + C[i] x[i+1] = d[i]` with
/// `x[i]` a two-vector. `A[0]` and `C[n-1]` are ignored.
///
/// Elimination inverts each pivot block explicitly; a pivot whose
/// determinant is below [`SINGULARITY_THRESHOLD`] in magnitude aborts the
/// solve with `LinearSolveError::SingularPivot`.
///
/// # Example
///
/// ```
/// use nalgebra::{Matrix2, Vector2};
/// use pricer_core::math::linalg::BlockTridiagonalSystem;
///
/// let mut system = BlockTridiagonalSystem::new(2);
/// let zero = Matrix2::zeros();
/// let eye = Matrix2::identity();
/// system.set_row(0, zero, eye * 2.0, eye, Vector2::new(3.0, 3.0));
/// system.set_row(1, eye, eye * 2.0, zero, Vector2::new(3.0, 3.0));
///
/// let x = system.solve().unwrap();
/// assert!((x[0][0] - 1.0).abs() < 1e-12);
/// assert!((x[1][1] - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BlockTridiagonalSystem {
    lower: Vec<Matrix2<f64>>,
    diag: Vec<Matrix2<f64>>,
    upper: Vec<Matrix2<f64>>,
    rhs: Vec<Vector2<f64>>,
    c_prime: Vec<Matrix2<f64>>,
    solution: Vec<Vector2<f64>>,
}

impl BlockTridiagonalSystem {
    /// Allocate a zeroed system with `n` block rows.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![Matrix2::zeros(); n],
            diag: vec![Matrix2::zeros(); n],
            upper: vec![Matrix2::zeros(); n],
            rhs: vec![Vector2::zeros(); n],
            c_prime: vec![Matrix2::zeros(); n],
            solution: vec![Vector2::zeros(); n],
        }
    }

    /// Number of block rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// Whether the system has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Overwrite block row `i`.
    #[inline]
    pub fn set_row(
        &mut self,
        i: usize,
        lower: Matrix2<f64>,
        diag: Matrix2<f64>,
        upper: Matrix2<f64>,
        rhs: Vector2<f64>,
    ) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
        self.rhs[i] = rhs;
    }

    /// Solve in place and return the block solution.
    ///
    /// # Errors
    ///
    /// - `LinearSolveError::SingularPivot` if a pivot block is singular;
    ///   `pivot` carries its determinant
    /// - `LinearSolveError::NonFinite` if the solution contains NaN or infinity
    pub fn solve(&mut self) -> Result<&[Vector2<f64>], LinearSolveError> {
        let n = self.diag.len();
        if n == 0 {
            return Ok(&self.solution);
        }

        let x = &mut self.solution;
        let cp = &mut self.c_prime;

        let inv = invert(&self.diag[0], 0)?;
        cp[0] = inv * self.upper[0];
        x[0] = inv * self.rhs[0];

        for i in 1..n {
            let pivot = self.diag[i] - self.lower[i] * cp[i - 1];
            let inv = invert(&pivot, i)?;
            cp[i] = inv * self.upper[i];
            x[i] = inv * (self.rhs[i] - self.lower[i] * x[i - 1]);
        }

        for i in (0..n - 1).rev() {
            let next = x[i + 1];
            x[i] -= cp[i] * next;
        }

        if let Some(row) = x.iter().position(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(LinearSolveError::NonFinite { row });
        }
        Ok(&self.solution)
    }
}

fn invert(block: &Matrix2<f64>, row: usize) -> Result<Matrix2<f64>, LinearSolveError> {
    let det = block.determinant();
    if det.abs() < SINGULARITY_THRESHOLD || !det.is_finite() {
        return Err(LinearSolveError::SingularPivot { row, pivot: det });
    }
    block
        .try_inverse()
        .ok_or(LinearSolveError::SingularPivot { row, pivot: det })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linalg::solve_tridiagonal;
    use approx::assert_relative_eq;

    #[test]
    fn test_diagonal_blocks_match_scalar_solves() {
        // With diagonal blocks the two components decouple.
        let n = 6;
        let mut system = BlockTridiagonalSystem::new(n);
        for i in 0..n {
            let lower = Matrix2::from_diagonal(&Vector2::new(-1.0, -0.5));
            let diag = Matrix2::from_diagonal(&Vector2::new(3.0, 2.0));
            let upper = Matrix2::from_diagonal(&Vector2::new(-1.0, -0.25));
            let rhs = Vector2::new(i as f64, 1.0 + i as f64);
            system.set_row(i, lower, diag, upper, rhs);
        }
        let blocks = system.solve().unwrap().to_vec();

        let first = solve_tridiagonal(
            &vec![-1.0; n - 1],
            &vec![3.0; n],
            &vec![-1.0; n - 1],
            &(0..n).map(|i| i as f64).collect::<Vec<_>>(),
        )
        .unwrap();
        let second = solve_tridiagonal(
            &vec![-0.5; n - 1],
            &vec![2.0; n],
            &vec![-0.25; n - 1],
            &(0..n).map(|i| 1.0 + i as f64).collect::<Vec<_>>(),
        )
        .unwrap();

        for i in 0..n {
            assert_relative_eq!(blocks[i][0], first[i], epsilon = 1e-12);
            assert_relative_eq!(blocks[i][1], second[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coupled_residual() {
        let n = 8;
        let lower = Matrix2::new(-1.0, 0.1, 0.2, -1.0);
        let diag = Matrix2::new(4.0, -0.3, -0.4, 5.0);
        let upper = Matrix2::new(-1.0, 0.0, 0.1, -2.0);
        let rhs: Vec<Vector2<f64>> = (0..n)
            .map(|i| Vector2::new((i as f64).sin(), (i as f64).cos()))
            .collect();

        let mut system = BlockTridiagonalSystem::new(n);
        for (i, r) in rhs.iter().enumerate() {
            system.set_row(i, lower, diag, upper, *r);
        }
        let x = system.solve().unwrap().to_vec();

        for i in 0..n {
            let mut ax = diag * x[i];
            if i > 0 {
                ax += lower * x[i - 1];
            }
            if i + 1 < n {
                ax += upper * x[i + 1];
            }
            assert_relative_eq!(ax[0], rhs[i][0], epsilon = 1e-12);
            assert_relative_eq!(ax[1], rhs[i][1], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_block() {
        let mut system = BlockTridiagonalSystem::new(2);
        let singular = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        system.set_row(0, Matrix2::zeros(), singular, Matrix2::zeros(), Vector2::zeros());
        system.set_row(1, Matrix2::zeros(), Matrix2::identity(), Matrix2::zeros(), Vector2::zeros());
        assert!(matches!(
            system.solve(),
            Err(LinearSolveError::SingularPivot { row: 0, .. })
        ));
    }
}
