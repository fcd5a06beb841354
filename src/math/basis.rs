//! Polynomial baseline basis for EMSC.
//!
//! The baseline is modelled by the monomials `1, u, u^2, ..., u^p` evaluated on
//! the wavelength index axis mapped linearly onto `u ∈ [-1, 1]`. Keeping the
//! axis inside `[-1, 1]` keeps the columns of comparable magnitude even for
//! high orders, which matters for the SVD cutoff in `math::ols`.

use nalgebra::DMatrix;

/// `num` evenly spaced points from `start` to `stop` (both inclusive).
///
/// `num = 1` returns `[start]`; `num = 0` returns an empty vector.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num as f64 - 1.0);
            (0..num)
                .map(|i| {
                    // Pin the last point exactly to `stop`.
                    if i == num - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Baseline basis of shape `(n_variables, p_order + 1)`.
///
/// Column `j` holds `u^j`; column 0 is the constant offset.
pub fn polynomial_baseline(n_variables: usize, p_order: usize) -> DMatrix<f64> {
    let axis = linspace(-1.0, 1.0, n_variables);
    DMatrix::from_fn(n_variables, p_order + 1, |i, j| powi(axis[i], j))
}

fn powi(base: f64, exp: usize) -> f64 {
    // `0^0 = 1`, matching the constant column.
    (0..exp).fold(1.0, |acc, _| acc * base)
}
