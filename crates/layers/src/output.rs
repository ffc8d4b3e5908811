// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Output heads: per-step posteriors and globally normalised transitions.

use crate::LayerError;
use matrix_core::{affine_map, robustlog_inplace, softmax_columns_inplace, Matrix};

/// Affine map followed by a numerically stable softmax over each column.
pub fn softmax(
    x: &Matrix,
    w: &Matrix,
    b: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let mut c = affine_map(x, w, b, out)?;
    softmax_columns_inplace(&mut c);
    Ok(c)
}

/// Affine map followed by global (CRF) normalisation.
///
/// Row `from * nstate + to` of each output column is the log-score of
/// moving from state `to` at the previous step into state `from`, with
/// `nstate * nstate == cols(w)`. The scores are shifted uniformly so the
/// log-partition function of the whole sequence is zero.
///
/// # Errors
/// Returns [`LayerError::InvalidParameter`] if `cols(w)` is not a perfect
/// square.
pub fn globalnorm(
    x: &Matrix,
    w: &Matrix,
    b: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    transition_states(w.cols())?;
    let mut c = affine_map(x, w, b, out)?;
    if c.cols() == 0 {
        return Ok(c);
    }
    let log_z = crf_log_partition(&c)?;
    let shift = log_z / c.cols() as f32;
    c.map_inplace(|v| v - shift);
    Ok(c)
}

/// Log-partition function of a transition-score matrix.
///
/// Runs the forward recursion from an all-zero initial state:
/// `α_t[i] = logsumexp_j(C_t[i * nstate + j] + α_{t-1}[j])`, returning
/// `logsumexp_i(α_T[i])`. An empty sequence has log-partition `ln(nstate)`.
pub fn crf_log_partition(c: &Matrix) -> Result<f32, LayerError> {
    let nstate = transition_states(c.rows())?;
    let mut prev = vec![0.0f32; nstate];
    let mut curr = vec![0.0f32; nstate];
    for col in c.columns() {
        for (from, slot) in curr.iter_mut().enumerate() {
            let scores = &col[from * nstate..(from + 1) * nstate];
            *slot = log_sum_exp(scores.iter().zip(&prev).map(|(s, p)| s + p));
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    Ok(log_sum_exp(prev.iter().copied()))
}

fn transition_states(rows: usize) -> Result<usize, LayerError> {
    let nstate = (rows as f64).sqrt().round() as usize;
    if nstate == 0 || nstate * nstate != rows {
        return Err(LayerError::invalid(
            "globalnorm",
            format!("{rows} transition rows is not a square number of states"),
        ));
    }
    Ok(nstate)
}

fn log_sum_exp(values: impl Iterator<Item = f32> + Clone) -> f32 {
    let max = values.clone().fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return max;
    }
    max + values.map(|v| (v - max).exp()).sum::<f32>().ln()
}

/// Replaces every probability `p` with `ln(max(p, min_prob))`.
///
/// # Errors
/// Returns an error if `min_prob` is not in `[0, 1]`; `x` is untouched.
pub fn robustlog_activation_inplace(x: &mut Matrix, min_prob: f32) -> Result<(), LayerError> {
    robustlog_inplace(x, min_prob)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use matrix_core::Shape;

    #[test]
    fn test_softmax_columns_sum_to_one() {
        let x = Matrix::from_fn(4, 6, |r, c| (r as f32 - c as f32) * 0.7);
        let w = Matrix::from_fn(4, 5, |r, c| ((r + c) % 3) as f32 - 1.0);
        let b = Matrix::from_vector(&[0.0, 0.1, 0.2, 0.3, 0.4]);
        let p = softmax(&x, &w, &b, None).unwrap();
        assert_eq!(p.shape(), Shape::new(5, 6));
        for col in p.columns() {
            assert_abs_diff_eq!(col.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
            assert!(col.iter().all(|&v| v > 0.0));
        }
        assert!(p.padding_is_zero());
    }

    #[test]
    fn test_log_partition_uniform() {
        // All-zero scores: every path has weight 1, nstate^(T + 1) paths.
        let c = Matrix::zeros(9, 4);
        let log_z = crf_log_partition(&c).unwrap();
        assert_abs_diff_eq!(log_z, 5.0 * 3.0f32.ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_globalnorm_zeroes_log_partition() {
        let x = Matrix::from_fn(3, 7, |r, c| ((r * 3 + c) % 5) as f32 * 0.2 - 0.4);
        let w = Matrix::from_fn(3, 16, |r, c| ((r + 2 * c) % 7) as f32 * 0.15 - 0.45);
        let b = Matrix::from_fn(16, 1, |r, _| r as f32 * 0.01);
        let t = globalnorm(&x, &w, &b, None).unwrap();
        assert_eq!(t.shape(), Shape::new(16, 7));
        assert_abs_diff_eq!(crf_log_partition(&t).unwrap(), 0.0, epsilon = 1e-4);
        assert!(t.padding_is_zero());
    }

    #[test]
    fn test_globalnorm_rejects_non_square() {
        let x = Matrix::zeros(2, 3);
        let w = Matrix::zeros(2, 10);
        let b = Matrix::zeros(10, 1);
        assert!(matches!(
            globalnorm(&x, &w, &b, None),
            Err(LayerError::InvalidParameter { layer: "globalnorm", .. })
        ));
    }

    #[test]
    fn test_robustlog_activation() {
        let mut m = Matrix::from_column_major(2, 1, &[0.0, 1.0]).unwrap();
        robustlog_activation_inplace(&mut m, 0.5).unwrap();
        assert_abs_diff_eq!(m[(0, 0)], 0.5f32.ln(), epsilon = 1e-6);
        assert!(robustlog_activation_inplace(&mut m, 2.0).is_err());
    }
}
