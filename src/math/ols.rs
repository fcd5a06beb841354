//! Least squares primitives.
//!
//! Every regression in this crate reduces to the ordinary problem
//!
//! ```text
//! minimize |y - X β|^2
//! ```
//!
//! possibly after scaling the rows of `X` and `y` by a weight vector.
//!
//! Implementation choices:
//! - SVD with a *relative* singular value cutoff (`ε · max(n, m) · σ_max`, the
//!   same default as LAPACK-backed `lstsq`). Directions below the cutoff are
//!   dropped, so rank-deficient designs yield the minimum-norm solution
//!   instead of an error. The ALS loop depends on this: a degenerate weighted
//!   subproblem must still produce coefficients.
//! - `None` is reserved for inputs or outputs that are not finite.

use nalgebra::{DMatrix, DVector, SVD};

/// Solve a least squares problem with a single right-hand side.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() {
        return None;
    }
    if x.ncols() == 0 {
        return Some(DVector::zeros(0));
    }
    if x.nrows() == 0 {
        return Some(DVector::zeros(x.ncols()));
    }
    if !all_finite(x.as_slice()) || !all_finite(y.as_slice()) {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let beta = svd.solve(y, rank_cutoff(&svd, x.nrows(), x.ncols())).ok()?;
    all_finite(beta.as_slice()).then_some(beta)
}

/// Solve a least squares problem with several right-hand sides at once.
///
/// Column `j` of the result is the solution for column `j` of `y`.
pub fn solve_least_squares_matrix(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if x.nrows() != y.nrows() {
        return None;
    }
    if x.ncols() == 0 || x.nrows() == 0 || y.ncols() == 0 {
        return Some(DMatrix::zeros(x.ncols(), y.ncols()));
    }
    if !all_finite(x.as_slice()) || !all_finite(y.as_slice()) {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let beta = svd.solve(y, rank_cutoff(&svd, x.nrows(), x.ncols())).ok()?;
    all_finite(beta.as_slice()).then_some(beta)
}

/// Solve `minimize |diag(w) (y - X β)|^2`.
///
/// Rows of `X` and `y` are multiplied by `w` (not `sqrt(w)`), so the
/// effective per-row weight in the squared objective is `w^2`.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    w: &DVector<f64>,
) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || w.len() != y.len() {
        return None;
    }

    let mut xw = x.clone();
    for (i, mut row) in xw.row_iter_mut().enumerate() {
        row *= w[i];
    }
    let yw = y.component_mul(w);

    solve_least_squares(&xw, &yw)
}

fn rank_cutoff(svd: &SVD<f64, nalgebra::Dyn, nalgebra::Dyn>, n: usize, m: usize) -> f64 {
    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    f64::EPSILON * n.max(m) as f64 * sigma_max
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
