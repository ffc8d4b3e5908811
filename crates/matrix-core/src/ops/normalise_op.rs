// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Column normalisation.

use crate::Matrix;

/// Rescales every column so its logical rows sum to one.
///
/// Each column is divided by its sum. Columns whose sum is exactly zero are
/// left unchanged. Padding rows are never read or written.
pub fn row_normalise_inplace(c: &mut Matrix) {
    for col in c.columns_mut() {
        let sum: f32 = col.iter().sum();
        if sum != 0.0 {
            col.iter_mut().for_each(|x| *x /= sum);
        }
    }
}
