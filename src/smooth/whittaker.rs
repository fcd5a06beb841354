//! Whittaker smoother.
//!
//! For every column `x` the smoother solves the penalized least squares problem
//!
//! ```text
//! minimize |x - z|^2 + λ |D_d z|^2
//! ```
//!
//! where `D_d` is the order-`d` forward-difference operator. The minimizer is
//! `z = (I + λ D_dᵀ D_d)⁻¹ x`; the system matrix is symmetric positive
//! definite (its smallest eigenvalue is at least 1), so a Cholesky
//! factorization is used and shared across all columns.
//!
//! Rows are points along the spectral axis, columns are independent series.

use nalgebra::{Cholesky, DMatrix, Dyn};

use crate::error::ChemError;
use crate::math::diff_matrix;

/// Default order of the difference penalty.
pub const DEFAULT_CONSTRAINT_ORDER: usize = 2;

/// Smooth every column of `x`.
pub fn whittaker(
    x: &DMatrix<f64>,
    penalty: f64,
    constraint_order: usize,
) -> Result<DMatrix<f64>, ChemError> {
    validate_penalty(penalty)?;
    if x.nrows() == 0 {
        return Ok(x.clone());
    }
    let chol = factorize(x.nrows(), penalty, constraint_order)?;
    Ok(chol.solve(x))
}

/// Mean leverage `h̄ = tr(H) / n` of the smoother's hat matrix
/// `H = (I + λ DᵀD)⁻¹` for a series of `n_var` points.
///
/// `h̄ = 1` means no smoothing at all; `h̄ → (d / n_var)` as `λ → ∞`.
pub fn whittaker_h_bar(
    n_var: usize,
    penalty: f64,
    constraint_order: usize,
) -> Result<f64, ChemError> {
    validate_penalty(penalty)?;
    if n_var == 0 {
        return Err(ChemError::InvalidParameter(
            "Leverage needs at least one variable.".to_string(),
        ));
    }
    let hat = factorize(n_var, penalty, constraint_order)?.inverse();
    Ok(hat.diagonal().mean())
}

/// Generalized leave-one-out cross-validation error of the smoother.
///
/// Uses the mean leverage in place of the individual diagonal entries:
/// `sqrt(mean(((x - z) / (1 - h̄))^2))` over all entries of `x`.
pub fn whittaker_cve(
    x: &DMatrix<f64>,
    penalty: f64,
    constraint_order: usize,
) -> Result<f64, ChemError> {
    if x.is_empty() {
        return Err(ChemError::InvalidParameter(
            "Cross-validation needs a non-empty matrix.".to_string(),
        ));
    }
    let smoothed = whittaker(x, penalty, constraint_order)?;
    let h_bar = whittaker_h_bar(x.nrows(), penalty, constraint_order)?;

    let denom = 1.0 - h_bar;
    if denom <= f64::EPSILON {
        return Err(ChemError::DegenerateLeverage { h_bar });
    }

    let residuals = x - smoothed;
    let mse = residuals.iter().map(|r| (r / denom).powi(2)).sum::<f64>() / x.len() as f64;
    Ok(mse.sqrt())
}

fn validate_penalty(penalty: f64) -> Result<(), ChemError> {
    if !(penalty.is_finite() && penalty >= 0.0) {
        return Err(ChemError::InvalidParameter(format!(
            "Smoothing penalty must be finite and non-negative, got {penalty}."
        )));
    }
    Ok(())
}

fn factorize(n: usize, penalty: f64, order: usize) -> Result<Cholesky<f64, Dyn>, ChemError> {
    let d = diff_matrix(n, order);
    let mut system = d.tr_mul(&d) * penalty;
    for i in 0..n {
        system[(i, i)] += 1.0;
    }
    Cholesky::new(system).ok_or(ChemError::Factorization { penalty, order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::StandardNormal;

    fn noise(seed: u64, rows: usize, cols: usize) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        DMatrix::from_fn(rows, cols, |_, _| rng.sample(StandardNormal))
    }

    #[test]
    fn smoothing_preserves_shape() {
        let x = noise(1, 100, 50);
        for order in [1, 2] {
            let z = whittaker(&x, 100.0, order).unwrap();
            assert_eq!(z.shape(), (100, 50));
        }
    }

    #[test]
    fn zero_penalty_returns_input() {
        let x = noise(2, 50, 1);
        let z = whittaker(&x, 0.0, DEFAULT_CONSTRAINT_ORDER).unwrap();
        for (a, b) in x.iter().zip(z.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn huge_first_order_penalty_flattens_to_mean() {
        let x = noise(3, 50, 1);
        let mean = x.mean();
        let z = whittaker(&x, 1e9, 1).unwrap();
        for v in z.iter() {
            assert!((v - mean).abs() < 1e-4, "{v} vs mean {mean}");
        }
    }

    #[test]
    fn second_order_penalty_keeps_straight_lines() {
        let x = DMatrix::from_fn(40, 2, |i, j| 0.5 * i as f64 - 3.0 * j as f64);
        let z = whittaker(&x, 1e4, 2).unwrap();
        for (a, b) in x.iter().zip(z.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn negative_penalty_is_rejected() {
        let x = noise(4, 10, 1);
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                whittaker(&x, bad, 2),
                Err(ChemError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn h_bar_is_a_proper_fraction() {
        for n_var in [30, 300] {
            let h_bar = whittaker_h_bar(n_var, 0.5, 2).unwrap();
            assert!(h_bar.is_finite());
            assert!(h_bar > 0.0 && h_bar < 1.0, "n_var={n_var}: {h_bar}");
        }
        let unsmoothed = whittaker_h_bar(30, 0.0, 2).unwrap();
        assert!((unsmoothed - 1.0).abs() < 1e-12);
    }

    #[test]
    fn h_bar_decreases_with_penalty() {
        let weak = whittaker_h_bar(60, 1.0, 2).unwrap();
        let strong = whittaker_h_bar(60, 1e4, 2).unwrap();
        assert!(strong < weak);
    }

    #[test]
    fn cve_is_finite_for_synthetic_spectrum() {
        let mut rng = StdRng::seed_from_u64(5);
        let n_wl = 200;
        let background = crate::data::generate_background(&mut rng, n_wl, 0.5, 1).unwrap();
        let spectrum = crate::data::generate_spectra(&mut rng, n_wl, 20, 1.0).unwrap();
        let x = background + DMatrix::from_column_slice(n_wl, 1, spectrum.as_slice());

        let cve = whittaker_cve(&x, 1e5, DEFAULT_CONSTRAINT_ORDER).unwrap();
        assert!(cve.is_finite() && cve >= 0.0);
    }

    #[test]
    fn cve_without_smoothing_is_undefined() {
        let x = noise(6, 20, 1);
        let err = whittaker_cve(&x, 0.0, 2).unwrap_err();
        assert!(matches!(err, ChemError::DegenerateLeverage { .. }));
    }
}
