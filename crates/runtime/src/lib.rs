// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The fixed model graphs, the model registry and the engine that runs them.
//!
//! The runtime takes:
//! - Validated weight bundles from `model-ir`.
//! - Caller-owned inputs: a [`RawTable`], a [`FeatureTable`] or a symbol
//!   slice.
//!
//! And produces a lane-padded [`Matrix`] of posteriors, transition scores
//! or predicted signal, or `None` for an empty input.
//!
//! # Type-State Pipeline
//! ```text
//! InferenceEngine<Idle> → InferenceEngine<Ready>
//! ```
//! Transitions are compile-time checked.
//!
//! # Parallelism
//! Calls are single-threaded except for the two scans of a bidirectional
//! layer, which may run under `rayon::join`. A dedicated rayon pool can be
//! sized through [`RuntimeConfig::num_threads`].

mod config;
mod engine;
mod error;
pub mod graphs;
mod input;
mod metrics;
pub mod registry;

pub use config::RuntimeConfig;
pub use engine::{EngineState, Idle, InferenceEngine, InferenceOutput, Ready};
pub use error::RuntimeError;
pub use graphs::{PosteriorOptions, DEFAULT_MIN_PROB};
pub use input::{features_from_raw, FeatureTable, RawTable};
pub use metrics::InferenceMetrics;
pub use registry::{get_model, get_squiggle_model, ModelEntry, SquiggleEntry};

pub use nn_layers::Matrix;
