// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One-dimensional convolution along the column (time) axis.
//!
//! Both convolutions unfold the input into a matrix whose column `j` stacks
//! `kw` consecutive input columns, then apply a single affine map. Row
//! `t * rows(x) + r` of an unfolded column holds row `r` of the `t`-th
//! input column in the window, so `W` is `[kw * rows(x), channels]`.

use crate::LayerError;
use matrix_core::{affine_map, Matrix, Shape};

/// Valid convolution: only windows fully inside the input are evaluated.
///
/// Produces `floor((nc - kw) / stride) + 1` columns when `nc >= kw` and zero
/// columns otherwise, where `kw = rows(w) / rows(x)`.
///
/// # Errors
/// Returns [`LayerError::InvalidParameter`] if `stride` is zero or `rows(w)`
/// is not a positive multiple of `rows(x)`, and a shape mismatch if `b` or
/// `out` have the wrong shape.
pub fn convolution(
    x: &Matrix,
    w: &Matrix,
    b: &Matrix,
    stride: usize,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let kw = kernel_width(x, w)?;
    check_stride("convolution", stride)?;
    let ncol = if x.cols() >= kw {
        (x.cols() - kw) / stride + 1
    } else {
        0
    };
    let unfolded = unfold(x, kw, stride, 0, ncol);
    Ok(affine_map(&unfolded, w, b, out)?)
}

/// Same-padded convolution: windows are centred on every `stride`-th input
/// column with zero fill past either edge.
///
/// Produces `ceil(nc / stride)` columns, so a stride-one stack of these
/// keeps the sequence length and residual connections line up.
pub fn convolution_same(
    x: &Matrix,
    w: &Matrix,
    b: &Matrix,
    stride: usize,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let kw = kernel_width(x, w)?;
    let unfolded = window(x, kw, stride)?;
    Ok(affine_map(&unfolded, w, b, out)?)
}

/// Stacks `width` neighbouring columns of `x` into each output column.
///
/// Output column `j` is centred on input column `j * stride` (the window
/// starts `width / 2` columns earlier). Positions outside the input are
/// zero. The result is `[rows(x) * width, ceil(cols(x) / stride)]`.
pub fn window(x: &Matrix, width: usize, stride: usize) -> Result<Matrix, LayerError> {
    if width == 0 {
        return Err(LayerError::invalid("window", "window width must be positive"));
    }
    check_stride("window", stride)?;
    let ncol = x.cols().div_ceil(stride);
    Ok(unfold(x, width, stride, width / 2, ncol))
}

/// Builds the unfolded matrix. Output column `j` reads input columns
/// `j * stride + t - left` for `t` in `0..width`.
fn unfold(x: &Matrix, width: usize, stride: usize, left: usize, ncol: usize) -> Matrix {
    let nr = x.rows();
    let mut u = Matrix::zeros(nr * width, ncol);
    for j in 0..ncol {
        let dst = u.column_mut(j);
        for t in 0..width {
            let Some(src) = (j * stride + t).checked_sub(left) else {
                continue;
            };
            if src < x.cols() {
                dst[t * nr..(t + 1) * nr].copy_from_slice(x.column(src));
            }
        }
    }
    u
}

fn kernel_width(x: &Matrix, w: &Matrix) -> Result<usize, LayerError> {
    if x.rows() == 0 || w.rows() == 0 || w.rows() % x.rows() != 0 {
        return Err(LayerError::invalid(
            "convolution",
            format!(
                "weight {} is not a whole number of windows over {} input rows",
                w.shape(),
                x.rows()
            ),
        ));
    }
    Ok(w.rows() / x.rows())
}

fn check_stride(layer: &'static str, stride: usize) -> Result<(), LayerError> {
    if stride == 0 {
        return Err(LayerError::invalid(layer, "stride must be positive"));
    }
    Ok(())
}

/// Convolution weights: `W` is `[kw * in_channels, out_channels]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv1d {
    w: Matrix,
    b: Matrix,
    in_channels: usize,
    stride: usize,
}

impl Conv1d {
    /// Validates the kernel layout for `in_channels` input rows.
    pub fn new(w: Matrix, b: Matrix, in_channels: usize, stride: usize) -> Result<Self, LayerError> {
        if in_channels == 0 || w.rows() == 0 || w.rows() % in_channels != 0 {
            return Err(LayerError::invalid(
                "conv1d",
                format!("weight {} does not tile {in_channels} input channels", w.shape()),
            ));
        }
        if b.shape() != Shape::vector(w.cols()) {
            return Err(LayerError::invalid(
                "conv1d",
                format!("bias {} does not match weight {}", b.shape(), w.shape()),
            ));
        }
        check_stride("conv1d", stride)?;
        Ok(Self {
            w,
            b,
            in_channels,
            stride,
        })
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn out_channels(&self) -> usize {
        self.w.cols()
    }

    pub fn kernel_width(&self) -> usize {
        self.w.rows() / self.in_channels
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn w(&self) -> &Matrix {
        &self.w
    }

    pub fn b(&self) -> &Matrix {
        &self.b
    }

    /// Valid convolution over `x`.
    pub fn forward(&self, x: &Matrix, out: Option<Matrix>) -> Result<Matrix, LayerError> {
        convolution(x, &self.w, &self.b, self.stride, out)
    }

    /// Same-padded convolution over `x`.
    pub fn forward_same(&self, x: &Matrix, out: Option<Matrix>) -> Result<Matrix, LayerError> {
        convolution_same(x, &self.w, &self.b, self.stride, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn signal(n: usize) -> Matrix {
        Matrix::from_fn(1, n, |_, c| c as f32)
    }

    #[test]
    fn test_valid_column_count() {
        let x = signal(20);
        let w = Matrix::zeros(5, 3);
        let b = Matrix::zeros(3, 1);
        for stride in 1..6 {
            let y = convolution(&x, &w, &b, stride, None).unwrap();
            assert_eq!(y.cols(), (20 - 5) / stride + 1, "stride {stride}");
            assert_eq!(y.rows(), 3);
        }
    }

    #[test]
    fn test_short_input_gives_no_columns() {
        let x = signal(3);
        let w = Matrix::zeros(5, 2);
        let b = Matrix::zeros(2, 1);
        let y = convolution(&x, &w, &b, 1, None).unwrap();
        assert_eq!(y.shape(), Shape::new(2, 0));
    }

    #[test]
    fn test_moving_sum() {
        // kernel of ones over three samples, stride 2
        let x = signal(7);
        let w = Matrix::from_fn(3, 1, |_, _| 1.0);
        let b = Matrix::from_vector(&[0.5]);
        let y = convolution(&x, &w, &b, 2, None).unwrap();
        assert_eq!(y.to_column_major(), vec![3.5, 9.5, 15.5]);
    }

    #[test]
    fn test_same_keeps_length() {
        let x = Matrix::from_fn(2, 9, |r, c| (r + c) as f32);
        let w = Matrix::from_fn(6, 4, |r, c| (r as f32 - c as f32) * 0.1);
        let b = Matrix::zeros(4, 1);
        let y = convolution_same(&x, &w, &b, 1, None).unwrap();
        assert_eq!(y.shape(), Shape::new(4, 9));
        let y2 = convolution_same(&x, &w, &b, 2, None).unwrap();
        assert_eq!(y2.cols(), 5);
    }

    #[test]
    fn test_window_centred_zero_fill() {
        let x = Matrix::from_fn(2, 3, |r, c| (10 * c + r + 1) as f32);
        let u = window(&x, 3, 1).unwrap();
        assert_eq!(u.shape(), Shape::new(6, 3));
        assert_eq!(u.column(0), &[0.0, 0.0, 1.0, 2.0, 11.0, 12.0]);
        assert_eq!(u.column(1), &[1.0, 2.0, 11.0, 12.0, 21.0, 22.0]);
        assert_eq!(u.column(2), &[11.0, 12.0, 21.0, 22.0, 0.0, 0.0]);
        assert!(u.padding_is_zero());
    }

    #[test]
    fn test_same_matches_window_then_affine() {
        let x = Matrix::from_fn(1, 6, |_, c| (c as f32).sin());
        let w = Matrix::from_fn(3, 2, |r, c| (r + 2 * c) as f32 * 0.3);
        let b = Matrix::from_vector(&[0.1, -0.1]);
        let y = convolution_same(&x, &w, &b, 1, None).unwrap();
        // column 0 window: [0, x0, x1]
        let expect = b[(1, 0)] + w[(1, 1)] * x[(0, 0)] + w[(2, 1)] * x[(0, 1)];
        assert_abs_diff_eq!(y[(1, 0)], expect, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_parameters() {
        let x = Matrix::zeros(2, 10);
        let b = Matrix::zeros(1, 1);
        assert!(convolution(&x, &Matrix::zeros(5, 1), &b, 1, None).is_err());
        assert!(convolution(&x, &Matrix::zeros(4, 1), &b, 0, None).is_err());
        assert!(window(&x, 0, 1).is_err());
        assert!(Conv1d::new(Matrix::zeros(5, 1), b.clone(), 2, 1).is_err());
        assert!(Conv1d::new(Matrix::zeros(4, 1), b, 2, 1).is_ok());
    }
}
