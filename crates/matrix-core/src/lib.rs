// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # matrix-core
//!
//! Lane-padded matrices and the linear-algebra primitives every network
//! layer is built from.
//!
//! This crate provides:
//! - [`Matrix`]: a column-major `f32` matrix whose columns are padded to a
//!   multiple of [`LANE_WIDTH`] rows.
//! - [`Shape`]: the logical `rows × cols` descriptor.
//! - Primitive operations: [`affine_map`], [`affine_map2`],
//!   [`row_normalise_inplace`], column softmax, elementwise activations and
//!   the transposed matrix-product kernels they share.
//!
//! # Layout
//! ```text
//!            col 0   col 1   col 2
//!   row 0  [  a00     a01     a02 ]
//!   row 1  [  a10     a11     a12 ]
//!   row 2  [  a20     a21     a22 ]
//!   pad    [  0.0     0.0     0.0 ]   <- always zero
//! ```
//! Every reduction down a column (dot products, sums) runs over the full
//! padded column in lane-sized chunks. The padding rows contribute nothing
//! because they are kept at zero by every operation in the workspace.
//!
//! # Buffer reuse
//! Operations that produce a matrix take an `out: Option<Matrix>`. `None`
//! allocates a fresh result; `Some(buffer)` moves the buffer in, checks its
//! shape and hands it back as the result. Ownership makes aliasing and
//! double release impossible.

mod error;
mod matrix;
mod ops;
mod shape;

pub use error::MatrixError;
pub use matrix::{Matrix, LANE_WIDTH};
pub use ops::{
    add_inplace, affine_map, affine_map2, elu_inplace, exp_inplace, gemv_transposed,
    robustlog_inplace, row_normalise_inplace, softmax_columns_inplace, tanh_inplace,
};
pub use shape::Shape;
