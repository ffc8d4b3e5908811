// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property tests for the padded matrix and its primitives.

use matrix_core::{
    add_inplace, affine_map, affine_map2, robustlog_inplace, row_normalise_inplace, Matrix,
    MatrixError, LANE_WIDTH,
};
use proptest::prelude::*;

/// Generators for matrices with bounded, finite entries.
mod generators {
    use super::*;

    pub fn arb_dims() -> impl Strategy<Value = (usize, usize)> {
        (1usize..12, 1usize..9)
    }

    pub fn arb_values(len: usize) -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(-2.0f32..2.0, len)
    }

    pub fn arb_matrix() -> impl Strategy<Value = Matrix> {
        arb_dims().prop_flat_map(|(r, c)| {
            arb_values(r * c).prop_map(move |v| Matrix::from_column_major(r, c, &v).unwrap())
        })
    }

    /// `(x, w, b)` with `rows(w) == rows(x)` and `b = [cols(w), 1]`.
    pub fn arb_affine_operands() -> impl Strategy<Value = (Matrix, Matrix, Matrix)> {
        (1usize..10, 1usize..8, 1usize..10).prop_flat_map(|(nr, nc, nout)| {
            (
                arb_values(nr * nc),
                arb_values(nr * nout),
                arb_values(nout),
            )
                .prop_map(move |(x, w, b)| {
                    (
                        Matrix::from_column_major(nr, nc, &x).unwrap(),
                        Matrix::from_column_major(nr, nout, &w).unwrap(),
                        Matrix::from_vector(&b),
                    )
                })
        })
    }
}

use generators::*;

fn naive_affine(x: &Matrix, w: &Matrix, b: &Matrix) -> Vec<f32> {
    let mut out = Vec::with_capacity(w.cols() * x.cols());
    for j in 0..x.cols() {
        for k in 0..w.cols() {
            let mut acc = b[(k, 0)] as f64;
            for i in 0..x.rows() {
                acc += w[(i, k)] as f64 * x[(i, j)] as f64;
            }
            out.push(acc as f32);
        }
    }
    out
}

fn close(a: f32, b: f32, rel: f32) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn construction_pads_with_zeros((r, c) in arb_dims(), seed in 0u32..1000) {
        let values: Vec<f32> = (0..r * c).map(|i| (i as f32 + seed as f32).sin()).collect();
        let m = Matrix::from_column_major(r, c, &values).unwrap();
        let padded = r.div_ceil(LANE_WIDTH) * LANE_WIDTH;
        prop_assert_eq!(m.padded_rows(), padded);
        prop_assert_eq!(m.as_padded_slice().len(), padded * c);
        prop_assert!(m.padding_is_zero());
        prop_assert_eq!(m.to_column_major(), values);
    }

    #[test]
    fn affine_map_matches_reference((x, w, b) in arb_affine_operands()) {
        let c = affine_map(&x, &w, &b, None).unwrap();
        prop_assert!(c.padding_is_zero());
        for (got, want) in c.to_column_major().iter().zip(naive_affine(&x, &w, &b)) {
            prop_assert!(close(*got, want, 1e-4), "{} vs {}", got, want);
        }
    }

    #[test]
    fn affine_map2_is_two_affines((xf, wf, b) in arb_affine_operands(), seed in 0u32..100) {
        let nrb = (seed as usize % 7) + 1;
        let xb = Matrix::from_fn(nrb, xf.cols(), |r, c| ((r * 3 + c + seed as usize) % 5) as f32 * 0.2 - 0.4);
        let wb = Matrix::from_fn(nrb, wf.cols(), |r, c| ((r + 2 * c) % 3) as f32 * 0.5 - 0.5);
        let zero = Matrix::zeros(wf.cols(), 1);

        let c = affine_map2(&xf, &xb, &wf, &wb, &b, None).unwrap();
        let f = affine_map(&xf, &wf, &b, None).unwrap();
        let g = affine_map(&xb, &wb, &zero, None).unwrap();
        for ((got, a), bb) in c.to_column_major().iter().zip(f.to_column_major()).zip(g.to_column_major()) {
            prop_assert!(close(*got, a + bb, 1e-4));
        }
    }

    #[test]
    fn row_normalise_gives_unit_columns((r, c) in arb_dims(), values in arb_values(128)) {
        let positive: Vec<f32> = values.iter().take(r * c).map(|v| v.abs() + 0.01).collect();
        let mut m = Matrix::from_column_major(r, c, &positive).unwrap();
        row_normalise_inplace(&mut m);
        for col in m.columns() {
            let sum: f32 = col.iter().sum();
            prop_assert!((sum - 1.0).abs() <= 1e-5, "column sum {}", sum);
        }
        prop_assert!(m.padding_is_zero());
    }

    #[test]
    fn residual_add_is_exact(a in arb_matrix()) {
        let mut b = Matrix::from_fn(a.rows(), a.cols(), |r, c| (r * 7 + c) as f32 * 0.125);
        let before = b.clone();
        add_inplace(&a, &mut b).unwrap();
        for ((sum, x), y) in b.to_column_major().iter().zip(a.to_column_major()).zip(before.to_column_major()) {
            prop_assert_eq!(*sum, x + y);
        }
        prop_assert!(b.padding_is_zero());
    }

    #[test]
    fn residual_mismatch_leaves_both_untouched(a in arb_matrix()) {
        let mut b = Matrix::zeros(a.rows() + 1, a.cols());
        let a_before = a.clone();
        let b_before = b.clone();
        let err = add_inplace(&a, &mut b).unwrap_err();
        let is_shape_mismatch = matches!(err, MatrixError::ShapeMismatch { .. });
        prop_assert!(is_shape_mismatch);
        prop_assert_eq!(a, a_before);
        prop_assert_eq!(b, b_before);
    }

    #[test]
    fn robustlog_is_bounded(values in arb_values(40), min_prob in 1e-6f32..0.5) {
        let probs: Vec<f32> = values.iter().map(|v| v.abs() / 2.0).collect();
        let mut m = Matrix::from_column_major(5, 8, &probs).unwrap();
        robustlog_inplace(&mut m, min_prob).unwrap();
        let floor = min_prob.ln();
        for v in m.to_column_major() {
            prop_assert!(v >= floor && v <= 0.0, "{} outside [{}, 0]", v, floor);
        }
        prop_assert!(m.padding_is_zero());
    }
}
