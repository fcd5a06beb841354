//! Finite-difference operators.

use nalgebra::DMatrix;

/// Forward-difference operator of the given order.
///
/// Returns the `(n - order) × n` matrix `D` such that `D x` is the
/// `order`-th difference of `x`. Equivalent to differencing the rows of the
/// `n × n` identity `order` times. `order = 0` is the identity; `order >= n`
/// yields an operator with no rows.
pub fn diff_matrix(n: usize, order: usize) -> DMatrix<f64> {
    let mut d = DMatrix::<f64>::identity(n, n);
    for _ in 0..order {
        if d.nrows() == 0 {
            break;
        }
        let rows = d.nrows() - 1;
        d = DMatrix::from_fn(rows, n, |i, j| d[(i + 1, j)] - d[(i, j)]);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_order_stencil() {
        let d = diff_matrix(4, 1);
        let expected = DMatrix::from_row_slice(
            3,
            4,
            &[
                -1.0, 1.0, 0.0, 0.0, //
                0.0, -1.0, 1.0, 0.0, //
                0.0, 0.0, -1.0, 1.0,
            ],
        );
        assert_eq!(d, expected);
    }

    #[test]
    fn higher_orders_use_binomial_stencils() {
        let mat_size = 10;
        let stencils: [&[f64]; 3] = [&[-1.0, 1.0], &[1.0, -2.0, 1.0], &[-1.0, 3.0, -3.0, 1.0]];
        for (k, stencil) in stencils.iter().enumerate() {
            let order = k + 1;
            let d = diff_matrix(mat_size, order);
            assert_eq!(d.shape(), (mat_size - order, mat_size));
            for i in 0..d.nrows() {
                for j in 0..mat_size {
                    let expected = if j >= i && j - i < stencil.len() {
                        stencil[j - i]
                    } else {
                        0.0
                    };
                    assert_eq!(d[(i, j)], expected, "order {order}, entry ({i}, {j})");
                }
            }
        }
    }

    #[test]
    fn degenerate_orders() {
        assert_eq!(diff_matrix(3, 0), DMatrix::identity(3, 3));
        assert_eq!(diff_matrix(3, 3).shape(), (0, 3));
        assert_eq!(diff_matrix(3, 5).shape(), (0, 3));
    }
}
