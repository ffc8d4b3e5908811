// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-column softmax.

use crate::Matrix;

/// Replaces every column with its softmax over the logical rows.
///
/// Uses the numerically stable variant that subtracts the column maximum
/// before exponentiation.
pub fn softmax_columns_inplace(x: &mut Matrix) {
    for col in x.columns_mut() {
        if col.is_empty() {
            continue;
        }
        let max_val = col.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        for v in col.iter_mut() {
            *v = (*v - max_val).exp();
            sum += *v;
        }
        let inv = 1.0 / sum;
        col.iter_mut().for_each(|v| *v *= inv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_softmax_uniform() {
        let mut m = Matrix::zeros(5, 2);
        softmax_columns_inplace(&mut m);
        for col in m.columns() {
            for &v in col {
                assert_abs_diff_eq!(v, 0.2, epsilon = 1e-6);
            }
        }
        assert!(m.padding_is_zero());
    }

    #[test]
    fn test_softmax_large_values_stable() {
        let mut m = Matrix::from_column_major(3, 1, &[1000.0, 1001.0, 1002.0]).unwrap();
        softmax_columns_inplace(&mut m);
        let col = m.column(0);
        assert!(col.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(col.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert!(col[2] > col[1] && col[1] > col[0]);
    }
}
