// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise activations.
//!
//! Activations that fix zero run over the whole padded buffer. The others
//! touch logical rows only so the padding stays zero.

use crate::{Matrix, MatrixError};

/// Hyperbolic tangent, in place.
pub fn tanh_inplace(x: &mut Matrix) {
    x.map_padded_inplace(f32::tanh);
}

/// Exponential linear unit, in place: `x < 0 ? exp(x) - 1 : x`.
pub fn elu_inplace(x: &mut Matrix) {
    x.map_padded_inplace(elu_scalar);
}

/// Natural exponential of every logical element, in place.
pub fn exp_inplace(x: &mut Matrix) {
    x.map_inplace(f32::exp);
}

/// Replaces every logical element `p` with `ln(max(p, min_prob))`.
///
/// # Errors
/// Returns [`MatrixError::Numeric`] if `min_prob` is not in `[0, 1]`.
pub fn robustlog_inplace(x: &mut Matrix, min_prob: f32) -> Result<(), MatrixError> {
    if !(0.0..=1.0).contains(&min_prob) {
        return Err(MatrixError::Numeric {
            op: "robustlog",
            detail: format!("probability floor {min_prob} outside [0, 1]"),
        });
    }
    x.map_inplace(|p| p.max(min_prob).ln());
    Ok(())
}

#[inline(always)]
fn elu_scalar(x: f32) -> f32 {
    if x < 0.0 {
        x.exp_m1()
    } else {
        x
    }
}
