// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Affine maps: `C = Wᵗ·X + b`.

use super::kernel::gemm_tn_accumulate;
use crate::{Matrix, MatrixError, Shape};

/// Computes `C[:, j] = Wᵗ · X[:, j] + b` for every column `j`.
///
/// `w` is `[rows(x), n]`, `b` is `[n, 1]` and the result is `[n, cols(x)]`.
/// The bias is copied into every output column before the product is
/// accumulated.
///
/// # Errors
/// Returns [`MatrixError::ShapeMismatch`] if `rows(w) != rows(x)`, if `b` is
/// not `[cols(w), 1]`, or if a provided `out` is not `[cols(w), cols(x)]`.
///
/// # Examples
/// ```
/// use matrix_core::{affine_map, Matrix};
/// let x = Matrix::from_column_major(2, 1, &[1.0, 2.0]).unwrap();
/// let w = Matrix::from_column_major(2, 1, &[3.0, 4.0]).unwrap();
/// let b = Matrix::from_vector(&[0.5]);
/// let c = affine_map(&x, &w, &b, None).unwrap();
/// assert_eq!(c[(0, 0)], 11.5);
/// ```
pub fn affine_map(
    x: &Matrix,
    w: &Matrix,
    b: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, MatrixError> {
    check_weight("affine_map", x, w)?;
    check_bias("affine_map", w, b)?;
    let mut c = Matrix::reuse_or_alloc(out, Shape::new(w.cols(), x.cols()), "affine_map (output)")?;
    broadcast_bias(b, &mut c);
    gemm_tn_accumulate(w, x, &mut c);
    Ok(c)
}

/// Computes `C[:, j] = Wfᵗ · Xf[:, j] + Wbᵗ · Xb[:, j] + b`.
///
/// Used to merge the outputs of a forward and a backward scan. Both
/// contributions share a single bias.
///
/// # Errors
/// Returns [`MatrixError::ShapeMismatch`] unless `rows(wf) == rows(xf)`,
/// `rows(wb) == rows(xb)`, `cols(wf) == cols(wb)`, `cols(xf) == cols(xb)`
/// and `b` is `[cols(wf), 1]`.
pub fn affine_map2(
    xf: &Matrix,
    xb: &Matrix,
    wf: &Matrix,
    wb: &Matrix,
    b: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, MatrixError> {
    check_weight("affine_map2 (forward)", xf, wf)?;
    check_weight("affine_map2 (backward)", xb, wb)?;
    if wf.cols() != wb.cols() {
        return Err(MatrixError::ShapeMismatch {
            op: "affine_map2 (weights)",
            lhs: wf.shape(),
            rhs: wb.shape(),
        });
    }
    if xf.cols() != xb.cols() {
        return Err(MatrixError::ShapeMismatch {
            op: "affine_map2 (inputs)",
            lhs: xf.shape(),
            rhs: xb.shape(),
        });
    }
    check_bias("affine_map2", wf, b)?;
    let mut c = Matrix::reuse_or_alloc(
        out,
        Shape::new(wf.cols(), xf.cols()),
        "affine_map2 (output)",
    )?;
    broadcast_bias(b, &mut c);
    gemm_tn_accumulate(wf, xf, &mut c);
    gemm_tn_accumulate(wb, xb, &mut c);
    Ok(c)
}

fn check_weight(op: &'static str, x: &Matrix, w: &Matrix) -> Result<(), MatrixError> {
    if w.rows() != x.rows() {
        return Err(MatrixError::ShapeMismatch {
            op,
            lhs: x.shape(),
            rhs: w.shape(),
        });
    }
    Ok(())
}

fn check_bias(op: &'static str, w: &Matrix, b: &Matrix) -> Result<(), MatrixError> {
    if b.shape() != Shape::vector(w.cols()) {
        return Err(MatrixError::ShapeMismatch {
            op,
            lhs: Shape::vector(w.cols()),
            rhs: b.shape(),
        });
    }
    Ok(())
}

fn broadcast_bias(b: &Matrix, c: &mut Matrix) {
    let bias = b.column(0);
    for col in c.columns_mut() {
        col.copy_from_slice(bias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn naive_affine(x: &Matrix, w: &Matrix, b: &Matrix) -> Vec<f32> {
        let mut out = Vec::new();
        for j in 0..x.cols() {
            for k in 0..w.cols() {
                let mut acc = b[(k, 0)];
                for i in 0..x.rows() {
                    acc += w[(i, k)] * x[(i, j)];
                }
                out.push(acc);
            }
        }
        out
    }

    #[test]
    fn test_affine_matches_naive() {
        let x = Matrix::from_fn(5, 7, |r, c| (r as f32 - 2.0) * 0.3 + c as f32 * 0.1);
        let w = Matrix::from_fn(5, 6, |r, c| ((r * 6 + c) % 5) as f32 * 0.25 - 0.5);
        let b = Matrix::from_fn(6, 1, |r, _| r as f32 * 0.1);
        let c = affine_map(&x, &w, &b, None).unwrap();
        assert_eq!(c.shape(), Shape::new(6, 7));
        assert!(c.padding_is_zero());
        for (got, want) in c.to_column_major().iter().zip(naive_affine(&x, &w, &b)) {
            assert_relative_eq!(*got, want, max_relative = 1e-4, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_affine_reuses_buffer() {
        let x = Matrix::from_fn(3, 2, |r, c| (r + c) as f32);
        let w = Matrix::from_fn(3, 2, |r, _| r as f32);
        let b = Matrix::from_vector(&[1.0, -1.0]);
        let mut buf = Matrix::zeros(2, 2);
        buf[(0, 0)] = 99.0;
        let c = affine_map(&x, &w, &b, Some(buf)).unwrap();
        let fresh = affine_map(&x, &w, &b, None).unwrap();
        assert_eq!(c, fresh);
    }

    #[test]
    fn test_affine_rejects_bad_shapes() {
        let x = Matrix::zeros(3, 2);
        let w = Matrix::zeros(4, 2);
        let b = Matrix::zeros(2, 1);
        assert!(matches!(
            affine_map(&x, &w, &b, None),
            Err(MatrixError::ShapeMismatch { op: "affine_map", .. })
        ));

        let w = Matrix::zeros(3, 2);
        let bad_bias = Matrix::zeros(3, 1);
        assert!(affine_map(&x, &w, &bad_bias, None).is_err());

        let bad_out = Matrix::zeros(2, 3);
        assert!(affine_map(&x, &w, &b, Some(bad_out)).is_err());
    }

    #[test]
    fn test_affine2_is_sum_of_affines() {
        let xf = Matrix::from_fn(4, 5, |r, c| (r as f32 * 0.5) - c as f32 * 0.2);
        let xb = Matrix::from_fn(6, 5, |r, c| (c as f32 * 0.3) - r as f32 * 0.1);
        let wf = Matrix::from_fn(4, 3, |r, c| (r + c) as f32 * 0.1);
        let wb = Matrix::from_fn(6, 3, |r, c| (r as f32 - c as f32) * 0.05);
        let b = Matrix::from_vector(&[0.1, 0.2, 0.3]);
        let zero = Matrix::zeros(3, 1);

        let c = affine_map2(&xf, &xb, &wf, &wb, &b, None).unwrap();
        let f = affine_map(&xf, &wf, &b, None).unwrap();
        let g = affine_map(&xb, &wb, &zero, None).unwrap();
        for ((got, a), bb) in c
            .to_column_major()
            .iter()
            .zip(f.to_column_major())
            .zip(g.to_column_major())
        {
            assert_relative_eq!(*got, a + bb, max_relative = 1e-5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_affine2_checks_every_precondition() {
        let xf = Matrix::zeros(4, 5);
        let xb = Matrix::zeros(6, 5);
        let wf = Matrix::zeros(4, 3);
        let wb = Matrix::zeros(6, 3);
        let b = Matrix::zeros(3, 1);
        assert!(affine_map2(&xf, &xb, &wf, &wb, &b, None).is_ok());
        assert!(affine_map2(&xf, &xb, &wb, &wb, &b, None).is_err());
        assert!(affine_map2(&xf, &xf, &wf, &wb, &b, None).is_err());
        assert!(affine_map2(&xf, &xb, &wf, &Matrix::zeros(6, 2), &b, None).is_err());
        assert!(affine_map2(&xf, &Matrix::zeros(6, 4), &wf, &wb, &b, None).is_err());
        assert!(affine_map2(&xf, &xb, &wf, &wb, &Matrix::zeros(2, 1), None).is_err());
    }
}
