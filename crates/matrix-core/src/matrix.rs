// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The lane-padded matrix type.

use crate::{MatrixError, Shape};
use std::ops::{Index, IndexMut};

/// Number of `f32` lanes each column is padded to a multiple of.
///
/// Any width is valid as long as padding lanes stay zero; four matches a
/// 128-bit vector register.
pub const LANE_WIDTH: usize = 4;

/// An owned, column-major `f32` matrix with lane-padded columns.
///
/// `Matrix` is the only data carrier between layers. The backing buffer is
/// exactly `shape.padded_len()` values long and every padding element is
/// zero. Public mutation goes through logical rows only, so the invariant
/// cannot be broken from outside the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    shape: Shape,
    data: Vec<f32>,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    ///
    /// # Examples
    /// ```
    /// use matrix_core::Matrix;
    /// let m = Matrix::zeros(3, 2);
    /// assert_eq!(m.padded_rows(), 4);
    /// assert_eq!(m.as_padded_slice().len(), 8);
    /// ```
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let shape = Shape::new(rows, cols);
        Self {
            shape,
            data: vec![0.0; shape.padded_len()],
        }
    }

    /// Copies a flat column-major array into the padded layout.
    ///
    /// Returns an error if `values.len() != rows * cols`.
    ///
    /// # Examples
    /// ```
    /// use matrix_core::Matrix;
    /// let m = Matrix::from_column_major(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(m[(1, 0)], 2.0);
    /// assert_eq!(m[(0, 1)], 3.0);
    /// ```
    pub fn from_column_major(rows: usize, cols: usize, values: &[f32]) -> Result<Self, MatrixError> {
        let expected = rows * cols;
        if values.len() != expected {
            return Err(MatrixError::BufferSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        let mut m = Self::zeros(rows, cols);
        if rows > 0 {
            for (col, src) in values.chunks_exact(rows).enumerate() {
                m.column_mut(col).copy_from_slice(src);
            }
        }
        Ok(m)
    }

    /// Creates a single-column matrix from a vector (used for biases).
    pub fn from_vector(values: &[f32]) -> Self {
        let mut m = Self::zeros(values.len(), 1);
        m.column_mut(0).copy_from_slice(values);
        m
    }

    /// Creates a matrix by evaluating `f(row, col)` for every logical element.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut m = Self::zeros(rows, cols);
        for col in 0..cols {
            for (row, v) in m.column_mut(col).iter_mut().enumerate() {
                *v = f(row, col);
            }
        }
        m
    }

    /// Returns the provided buffer if it has the requested shape, otherwise
    /// allocates a zeroed matrix.
    ///
    /// A provided buffer of the wrong shape is a [`MatrixError::ShapeMismatch`];
    /// it is never resized. The returned buffer's logical contents are
    /// unspecified and must be fully overwritten by the caller.
    pub fn reuse_or_alloc(
        out: Option<Matrix>,
        shape: Shape,
        op: &'static str,
    ) -> Result<Matrix, MatrixError> {
        match out {
            None => Ok(Self::zeros(shape.rows, shape.cols)),
            Some(m) if m.shape == shape => Ok(m),
            Some(m) => Err(MatrixError::ShapeMismatch {
                op,
                lhs: shape,
                rhs: m.shape,
            }),
        }
    }

    /// Returns the logical shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of logical rows.
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    /// Physical rows per column, padding included. Also the column stride.
    pub fn padded_rows(&self) -> usize {
        self.shape.padded_rows()
    }

    /// Returns `true` if the matrix holds no logical elements.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// The whole backing buffer, padding included.
    pub fn as_padded_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_padded_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Column `col` including its padding rows.
    ///
    /// # Panics
    /// Panics if `col >= self.cols()`.
    pub fn padded_column(&self, col: usize) -> &[f32] {
        let stride = self.padded_rows();
        &self.data[col * stride..(col + 1) * stride]
    }

    /// Logical rows of column `col`.
    ///
    /// # Panics
    /// Panics if `col >= self.cols()`.
    pub fn column(&self, col: usize) -> &[f32] {
        let stride = self.padded_rows();
        let start = col * stride;
        &self.data[start..start + self.shape.rows]
    }

    /// Mutable logical rows of column `col`.
    ///
    /// # Panics
    /// Panics if `col >= self.cols()`.
    pub fn column_mut(&mut self, col: usize) -> &mut [f32] {
        let stride = self.padded_rows();
        let start = col * stride;
        let rows = self.shape.rows;
        &mut self.data[start..start + rows]
    }

    /// Iterates over the logical rows of each column in order.
    pub fn columns(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let rows = self.shape.rows;
        self.padded_chunks().map(move |c| &c[..rows])
    }

    /// Iterates mutably over the logical rows of each column in order.
    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut [f32]> + '_ {
        let rows = self.shape.rows;
        let stride = self.padded_rows().max(1);
        self.data.chunks_exact_mut(stride).map(move |c| &mut c[..rows])
    }

    fn padded_chunks(&self) -> std::slice::ChunksExact<'_, f32> {
        // A zero-row matrix has an empty buffer; chunk size must be non-zero.
        self.data.chunks_exact(self.padded_rows().max(1))
    }

    /// Copies the logical contents out as a flat column-major vector.
    pub fn to_column_major(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.shape.num_elements());
        for col in self.columns() {
            out.extend_from_slice(col);
        }
        out
    }

    /// Returns `true` if every padding element is exactly zero.
    pub fn padding_is_zero(&self) -> bool {
        let rows = self.shape.rows;
        self.padded_chunks()
            .all(|c| c[rows..].iter().all(|&x| x == 0.0))
    }

    /// Applies `f` to every element of the padded buffer.
    ///
    /// `f(0.0)` must be `0.0` so the padding stays zero; this is checked in
    /// debug builds.
    pub fn map_padded_inplace(&mut self, f: impl Fn(f32) -> f32) {
        debug_assert!(f(0.0) == 0.0, "padded map must fix zero");
        self.data.iter_mut().for_each(|x| *x = f(*x));
    }

    /// Applies `f` to every logical element, leaving padding untouched.
    pub fn map_inplace(&mut self, f: impl Fn(f32) -> f32) {
        for col in self.columns_mut() {
            col.iter_mut().for_each(|x| *x = f(*x));
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    /// # Panics
    /// Panics if `row >= rows()` or `col >= cols()`.
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(
            row < self.shape.rows && col < self.shape.cols,
            "index ({row}, {col}) out of bounds for {}",
            self.shape
        );
        &self.data[col * self.padded_rows() + row]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        assert!(
            row < self.shape.rows && col < self.shape.cols,
            "index ({row}, {col}) out of bounds for {}",
            self.shape
        );
        let stride = self.padded_rows();
        &mut self.data[col * stride + row]
    }
}
