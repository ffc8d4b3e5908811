// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for layer evaluation and parameter construction.

use matrix_core::MatrixError;

/// Errors that can occur when building or evaluating a layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    /// An underlying matrix primitive rejected its operands.
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// An input symbol has no row in the embedding table.
    #[error("symbol {symbol} at position {position} outside embedding of {nsym} symbols")]
    SymbolOutOfRange {
        symbol: usize,
        position: usize,
        nsym: usize,
    },

    /// A layer parameter (weights, stride, window width) is invalid.
    #[error("invalid parameter for {layer}: {detail}")]
    InvalidParameter { layer: &'static str, detail: String },
}

impl LayerError {
    pub(crate) fn invalid(layer: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidParameter {
            layer,
            detail: detail.into(),
        }
    }
}
