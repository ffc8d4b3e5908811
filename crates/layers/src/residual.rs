// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use crate::LayerError;
use matrix_core::{add_inplace, Matrix};

/// Residual connection: `b += a`.
///
/// # Errors
/// Returns a shape mismatch if `a` and `b` differ in shape; both matrices
/// are left untouched.
pub fn residual_inplace(a: &Matrix, b: &mut Matrix) -> Result<(), LayerError> {
    add_inplace(a, b)?;
    Ok(())
}
