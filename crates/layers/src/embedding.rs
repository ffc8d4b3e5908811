// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Symbol embedding lookup.

use crate::LayerError;
use matrix_core::{Matrix, Shape};

/// Maps each symbol to the matching column of the embedding table `w`.
///
/// `w` is `[dim, nsym]`; the result is `[dim, symbols.len()]`.
///
/// # Errors
/// Returns [`LayerError::SymbolOutOfRange`] for a symbol `>= nsym`, before
/// anything is written.
pub fn embedding(
    symbols: &[usize],
    w: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let nsym = w.cols();
    if let Some((position, &symbol)) = symbols.iter().enumerate().find(|&(_, &s)| s >= nsym) {
        return Err(LayerError::SymbolOutOfRange {
            symbol,
            position,
            nsym,
        });
    }
    let mut e = Matrix::reuse_or_alloc(out, Shape::new(w.rows(), symbols.len()), "embedding")?;
    for (col, &symbol) in e.columns_mut().zip(symbols) {
        col.copy_from_slice(w.column(symbol));
    }
    Ok(e)
}

/// An embedding table of `nsym` columns, each `dim` rows tall.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    w: Matrix,
}

impl Embedding {
    pub fn new(w: Matrix) -> Result<Self, LayerError> {
        if w.is_empty() {
            return Err(LayerError::invalid("embedding", "empty embedding table"));
        }
        Ok(Self { w })
    }

    pub fn dim(&self) -> usize {
        self.w.rows()
    }

    pub fn num_symbols(&self) -> usize {
        self.w.cols()
    }

    pub fn w(&self) -> &Matrix {
        &self.w
    }

    pub fn forward(&self, symbols: &[usize], out: Option<Matrix>) -> Result<Matrix, LayerError> {
        embedding(symbols, &self.w, out)
    }
}
