// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for matrix operations.

use crate::Shape;

/// Errors that can occur during matrix operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    /// The provided flat buffer does not hold `rows * cols` values.
    #[error("buffer size mismatch: expected {expected} values, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Two matrices have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// A numeric argument is outside its valid domain.
    #[error("numeric error in {op}: {detail}")]
    Numeric {
        op: &'static str,
        detail: String,
    },
}
