// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise binary operations.

use crate::{Matrix, MatrixError};

/// Adds `a` into `b` elementwise: `b += a`.
///
/// # Errors
/// Returns [`MatrixError::ShapeMismatch`] if the shapes differ; neither
/// matrix is modified in that case.
pub fn add_inplace(a: &Matrix, b: &mut Matrix) -> Result<(), MatrixError> {
    if a.shape() != b.shape() {
        return Err(MatrixError::ShapeMismatch {
            op: "add_inplace",
            lhs: a.shape(),
            rhs: b.shape(),
        });
    }
    // Padding is zero in both operands, so the padded sum stays zero.
    for (dst, &src) in b.as_padded_slice_mut().iter_mut().zip(a.as_padded_slice()) {
        *dst += src;
    }
    Ok(())
}
