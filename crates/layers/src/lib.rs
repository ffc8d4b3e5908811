// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # nn-layers
//!
//! Stateless network layers over lane-padded [`Matrix`] values.
//!
//! Every layer is a free function over borrowed inputs and borrowed
//! weights. Layers that produce a new matrix take an `out: Option<Matrix>`
//! buffer that is reused when its shape matches and rejected otherwise.
//!
//! Alongside the functions, this crate provides shape-validated parameter
//! bundles ([`Dense`], [`Conv1d`], [`Embedding`], [`BiMerge`],
//! [`GruCell`], [`LstmCell`]) that model graphs hold as their weights.
//! Validation happens once at construction, so a graph that holds these
//! types cannot hit a weight shape mismatch at inference time.

mod activation;
mod convolution;
mod embedding;
mod error;
mod feedforward;
mod output;
mod recurrent;
mod residual;

pub use activation::Activation;
pub use convolution::{convolution, convolution_same, window, Conv1d};
pub use embedding::{embedding, Embedding};
pub use error::LayerError;
pub use feedforward::{feedforward2_tanh, feedforward_linear, BiMerge, Dense};
pub use output::{crf_log_partition, globalnorm, robustlog_activation_inplace, softmax};
pub use recurrent::{
    gru_backward, gru_forward, lstm_backward, lstm_forward, Cell, Direction, GruCell, LstmCell,
    RecurrentCell,
};
pub use residual::residual_inplace;

pub use matrix_core::Matrix;
