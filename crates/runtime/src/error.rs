// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference runtime.

use model_ir::{AnyFamily, ModelFamily};

/// Errors that can occur while configuring the runtime or running a graph.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Model lookup, loading or validation failed.
    #[error("model error: {0}")]
    ModelError(#[from] model_ir::ModelError),

    /// A layer rejected its operands.
    #[error("layer error: {0}")]
    LayerError(#[from] nn_layers::LayerError),

    /// A matrix primitive rejected its operands.
    #[error("matrix error: {0}")]
    MatrixError(#[from] matrix_core::MatrixError),

    /// Transition scores were requested in linear space.
    #[error("{family} emits log-space transition scores only; linear output is unsupported")]
    LinearTransitions { family: ModelFamily },

    /// A registry entry was handed weights of another family.
    #[error("{expected} graph given weights for {found}")]
    FamilyMismatch {
        expected: ModelFamily,
        found: ModelFamily,
    },

    /// The loaded model cannot serve the requested kind of call.
    #[error("loaded model '{loaded}' does not support {requested}")]
    WrongModelKind {
        requested: &'static str,
        loaded: AnyFamily,
    },

    /// Caller input or per-call options are malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
