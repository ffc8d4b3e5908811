// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Transposed matrix-product kernels shared by the affine maps and the
//! recurrent cells.

use crate::{Matrix, MatrixError, Shape, LANE_WIDTH};

/// Dot product of two equal-length padded columns.
///
/// Accumulates one partial sum per lane so the compiler can keep the loop
/// in vector registers.
#[inline]
pub(crate) fn dot_padded(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len() % LANE_WIDTH, 0);
    let mut acc = [0.0f32; LANE_WIDTH];
    for (ca, cb) in a.chunks_exact(LANE_WIDTH).zip(b.chunks_exact(LANE_WIDTH)) {
        for lane in 0..LANE_WIDTH {
            acc[lane] += ca[lane] * cb[lane];
        }
    }
    acc.iter().sum()
}

/// `c[k, j] += Σ_i w[i, k] · x[i, j]` over every logical output element.
///
/// Shapes are checked by the callers.
pub(crate) fn gemm_tn_accumulate(w: &Matrix, x: &Matrix, c: &mut Matrix) {
    debug_assert_eq!(w.rows(), x.rows());
    debug_assert_eq!(c.shape(), Shape::new(w.cols(), x.cols()));
    for j in 0..x.cols() {
        let xj = x.padded_column(j);
        let cj = c.column_mut(j);
        for (k, ck) in cj.iter_mut().enumerate() {
            *ck += dot_padded(w.padded_column(k), xj);
        }
    }
}

/// `y[k] += Σ_i w[i, k] · x[i]` for a single padded input vector.
///
/// `x` must be a padded column of `w.padded_rows()` values and `y` must hold
/// exactly `w.cols()` values. This is the state update used by recurrent
/// cells, where `x` is the previous hidden state.
///
/// # Errors
/// Returns [`MatrixError::ShapeMismatch`] if either slice has the wrong length.
pub fn gemv_transposed(w: &Matrix, x: &[f32], y: &mut [f32]) -> Result<(), MatrixError> {
    if x.len() != w.padded_rows() {
        return Err(MatrixError::ShapeMismatch {
            op: "gemv_transposed",
            lhs: Shape::vector(w.padded_rows()),
            rhs: Shape::vector(x.len()),
        });
    }
    if y.len() != w.cols() {
        return Err(MatrixError::ShapeMismatch {
            op: "gemv_transposed (output)",
            lhs: Shape::vector(w.cols()),
            rhs: Shape::vector(y.len()),
        });
    }
    for (k, yk) in y.iter_mut().enumerate() {
        *yk += dot_padded(w.padded_column(k), x);
    }
    Ok(())
}
