// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix arithmetic operations.
//!
//! Reductions run over whole padded columns in [`crate::LANE_WIDTH`]-sized
//! chunks. Producing operations accept an optional output buffer and hand it
//! back as the result.

mod activation_op;
mod affine_op;
mod elementwise_op;
mod kernel;
mod normalise_op;
mod softmax_op;

pub use activation_op::{elu_inplace, exp_inplace, robustlog_inplace, tanh_inplace};
pub use affine_op::{affine_map, affine_map2};
pub use elementwise_op::add_inplace;
pub use kernel::gemv_transposed;
pub use normalise_op::row_normalise_inplace;
pub use softmax_op::softmax_columns_inplace;
