// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully connected layers.

use crate::LayerError;
use matrix_core::{affine_map, affine_map2, tanh_inplace, Matrix, Shape};

/// Linear layer: `Wᵗ·X + b`.
pub fn feedforward_linear(
    x: &Matrix,
    w: &Matrix,
    b: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    Ok(affine_map(x, w, b, out)?)
}

/// Merges two inputs through a shared bias and a tanh:
/// `tanh(Wfᵗ·Xf + Wbᵗ·Xb + b)`.
pub fn feedforward2_tanh(
    xf: &Matrix,
    xb: &Matrix,
    wf: &Matrix,
    wb: &Matrix,
    b: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let mut c = affine_map2(xf, xb, wf, wb, b, out)?;
    tanh_inplace(&mut c);
    Ok(c)
}

/// Weights of a linear layer: `W` is `[input, output]`, `b` is `[output, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    w: Matrix,
    b: Matrix,
}

impl Dense {
    /// Validates that the bias has one row per output column of `w`.
    pub fn new(w: Matrix, b: Matrix) -> Result<Self, LayerError> {
        if b.shape() != Shape::vector(w.cols()) {
            return Err(LayerError::invalid(
                "dense",
                format!("bias {} does not match weight {}", b.shape(), w.shape()),
            ));
        }
        Ok(Self { w, b })
    }

    pub fn input_size(&self) -> usize {
        self.w.rows()
    }

    pub fn output_size(&self) -> usize {
        self.w.cols()
    }

    pub fn w(&self) -> &Matrix {
        &self.w
    }

    pub fn b(&self) -> &Matrix {
        &self.b
    }

    pub fn forward(&self, x: &Matrix, out: Option<Matrix>) -> Result<Matrix, LayerError> {
        feedforward_linear(x, &self.w, &self.b, out)
    }
}

/// Weights that merge a forward and a backward scan into one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct BiMerge {
    wf: Matrix,
    wb: Matrix,
    b: Matrix,
}

impl BiMerge {
    /// Validates that both weights share an output width matching the bias.
    pub fn new(wf: Matrix, wb: Matrix, b: Matrix) -> Result<Self, LayerError> {
        if wf.cols() != wb.cols() {
            return Err(LayerError::invalid(
                "bimerge",
                format!("forward weight {} and backward weight {} differ in width", wf.shape(), wb.shape()),
            ));
        }
        if b.shape() != Shape::vector(wf.cols()) {
            return Err(LayerError::invalid(
                "bimerge",
                format!("bias {} does not match weight {}", b.shape(), wf.shape()),
            ));
        }
        Ok(Self { wf, wb, b })
    }

    pub fn output_size(&self) -> usize {
        self.wf.cols()
    }

    pub fn wf(&self) -> &Matrix {
        &self.wf
    }

    pub fn wb(&self) -> &Matrix {
        &self.wb
    }

    pub fn b(&self) -> &Matrix {
        &self.b
    }

    pub fn forward(
        &self,
        xf: &Matrix,
        xb: &Matrix,
        out: Option<Matrix>,
    ) -> Result<Matrix, LayerError> {
        feedforward2_tanh(xf, xb, &self.wf, &self.wb, &self.b, out)
    }
}
