//! Asymmetric least squares (ALS) regression.
//!
//! Fits `y ≈ X β` while penalizing positive and negative residuals
//! differently. With a small asymmetry factor `a`, residuals above the fit
//! are cheap (weight `a`) and residuals below it are expensive (weight
//! `1 - a`), so the fit settles underneath the bulk of the data. This is the
//! classic baseline model of Boelens et al. (J. Chromatogr. A 1057, 2004).
//!
//! The problem is solved by iterative reweighting:
//!
//! - start from uniform weights (a plain least squares fit)
//! - solve the weighted problem with `math::solve_weighted_least_squares`
//! - reassign weights from the sign of each residual
//! - stop when the weights no longer change or the iteration cap is hit
//!
//! Each response column is an independent problem; columns are fit in
//! parallel and share the same iteration structure.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::ChemError;
use crate::math::solve_weighted_least_squares;

/// Asymmetry factor used when none is specified.
pub const DEFAULT_ASYM_FACTOR: f64 = 0.1;

/// Iteration cap used when none is specified.
pub const DEFAULT_MAX_ITER: usize = 10;

/// Options for a single ALS call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlsOptions {
    /// Weight assigned to positive residuals; negative residuals get `1 - a`.
    pub asym_factor: f64,
    /// Maximum number of reweighting iterations per column.
    pub max_iter: usize,
}

impl Default for AlsOptions {
    fn default() -> Self {
        Self {
            asym_factor: DEFAULT_ASYM_FACTOR,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl AlsOptions {
    pub fn with_asym_factor(asym_factor: f64) -> Self {
        Self {
            asym_factor,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ChemError> {
        let a = self.asym_factor;
        if !(a.is_finite() && a > 0.0 && a < 1.0) {
            return Err(ChemError::InvalidParameter(format!(
                "Asymmetry factor must lie strictly between 0 and 1, got {a}."
            )));
        }
        if self.max_iter == 0 {
            return Err(ChemError::InvalidParameter(
                "ALS needs at least one iteration.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of an ALS regression.
#[derive(Debug, Clone, PartialEq)]
pub struct AlsFit {
    /// Coefficients, `m × o` for `X: n × m` and `y: n × o`.
    pub beta: DMatrix<f64>,
    /// Reweighting iterations spent on each response column.
    pub iterations: Vec<usize>,
    /// Whether each column's weights stabilized before the iteration cap.
    pub converged: Vec<bool>,
}

impl AlsFit {
    /// `true` if every response column converged.
    pub fn converged(&self) -> bool {
        self.converged.iter().all(|&c| c)
    }

    /// Largest iteration count over all columns (0 when there are no columns).
    pub fn max_iterations(&self) -> usize {
        self.iterations.iter().copied().max().unwrap_or(0)
    }
}

/// Fit of one response column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFit {
    pub beta: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Asymmetric least squares regression of every column of `y` on `x`.
///
/// Reaching the iteration cap is not an error: the last coefficients are
/// returned and the column is flagged in `AlsFit::converged`.
pub fn asym_ls(x: &DMatrix<f64>, y: &DMatrix<f64>, opts: &AlsOptions) -> Result<AlsFit, ChemError> {
    opts.validate()?;
    if x.nrows() != y.nrows() {
        return Err(ChemError::ShapeMismatch {
            context: "ALS response matrix",
            expected: x.nrows(),
            found: y.nrows(),
        });
    }

    let columns: Vec<ColumnFit> = (0..y.ncols())
        .into_par_iter()
        .map(|j| fit_column(x, &y.column(j).into_owned(), opts, j))
        .collect::<Result<_, _>>()?;

    let mut beta = DMatrix::zeros(x.ncols(), y.ncols());
    let mut iterations = Vec::with_capacity(columns.len());
    let mut converged = Vec::with_capacity(columns.len());
    for (j, col) in columns.into_iter().enumerate() {
        beta.set_column(j, &col.beta);
        iterations.push(col.iterations);
        converged.push(col.converged);
    }

    Ok(AlsFit {
        beta,
        iterations,
        converged,
    })
}

/// Asymmetric least squares regression of a single response vector.
pub fn asym_ls_vector(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    opts: &AlsOptions,
) -> Result<ColumnFit, ChemError> {
    opts.validate()?;
    if x.nrows() != y.len() {
        return Err(ChemError::ShapeMismatch {
            context: "ALS response vector",
            expected: x.nrows(),
            found: y.len(),
        });
    }
    fit_column(x, y, opts, 0)
}

fn fit_column(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    opts: &AlsOptions,
    column: usize,
) -> Result<ColumnFit, ChemError> {
    let n = y.len();
    let a = opts.asym_factor;

    // All-ones cannot equal a reweighted vector (entries are `a` or `1 - a`),
    // so the loop always runs at least twice unless the cap is 1.
    let mut w = DVector::<f64>::from_element(n, 1.0);
    let mut beta = DVector::<f64>::zeros(x.ncols());
    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iter {
        beta = solve_weighted_least_squares(x, y, &w).ok_or(ChemError::DegenerateFit { column })?;

        let residuals = y - x * &beta;
        let w_new = residuals.map(|r| if r > 0.0 { a } else { 1.0 - a });
        iterations += 1;

        if w_new == w {
            converged = true;
            break;
        }
        w = w_new;
    }

    if converged {
        log::debug!("ALS column {column}: converged after {iterations} iterations");
    } else {
        log::warn!(
            "ALS column {column}: weights still changing after {iterations} iterations (asym_factor={a})"
        );
    }

    Ok(ColumnFit {
        beta,
        iterations,
        converged,
    })
}
