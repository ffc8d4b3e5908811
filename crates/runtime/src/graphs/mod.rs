// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fixed computation graphs.
//!
//! Every graph borrows its input and its weights, owns every intermediate
//! matrix, and returns `Ok(None)` for an empty input without computing
//! anything.
//!
//! ```text
//! posterior:  raw ─► conv + act ─► recurrent stack ─► softmax | globalnorm ─► [robustlog]
//! events:     features ─► window ─► 2 × (LSTM ⇄ LSTM ─► merge) ─► softmax ─► [robustlog]
//! squiggle:   symbols ─► embed ─► conv + tanh ─► 4 × (conv + tanh + residual) ─► conv ─► [units]
//! ```

mod events;
mod posterior;
mod squiggle;

pub use events::events_posterior;
pub use posterior::posterior;
pub use squiggle::{squiggle, transform_units_inplace};

use crate::RuntimeError;
use model_ir::BiLayer;
use nn_layers::{LayerError, Matrix};

/// Default floor applied before taking logarithms of probabilities.
pub const DEFAULT_MIN_PROB: f32 = 1e-5;

/// Per-call options for probability-output graphs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PosteriorOptions {
    /// Probability floor used by the log transform, in `[0, 1]`.
    pub min_prob: f32,
    /// Return `ln(max(p, min_prob))` instead of probabilities.
    pub return_log: bool,
    /// Run the two scans of a bidirectional layer on separate threads.
    pub parallel_scans: bool,
}

impl Default for PosteriorOptions {
    fn default() -> Self {
        Self {
            min_prob: DEFAULT_MIN_PROB,
            return_log: true,
            parallel_scans: true,
        }
    }
}

impl PosteriorOptions {
    /// Options for linear-space probabilities.
    pub fn linear() -> Self {
        Self {
            return_log: false,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RuntimeError> {
        if !(0.0..=1.0).contains(&self.min_prob) {
            return Err(RuntimeError::InvalidInput(format!(
                "probability floor {} outside [0, 1]",
                self.min_prob
            )));
        }
        Ok(())
    }
}

/// Scratch buffers carried from one bidirectional layer to the next.
#[derive(Debug, Default)]
struct ScanBuffers {
    forward: Option<Matrix>,
    backward: Option<Matrix>,
}

/// Runs both scans of `layer` over `x` and merges them.
///
/// The scans read the same input and share nothing else, so with
/// `parallel` set they run under `rayon::join`.
fn bidirectional(
    layer: &BiLayer,
    x: &Matrix,
    buffers: &mut ScanBuffers,
    parallel: bool,
) -> Result<Matrix, LayerError> {
    let fwd_out = reusable(buffers.forward.take(), layer.forward_scan().size(), x.cols());
    let bwd_out = reusable(buffers.backward.take(), layer.backward_scan().size(), x.cols());
    let (fwd, bwd) = if parallel {
        rayon::join(
            || layer.forward_scan().forward(x, fwd_out),
            || layer.backward_scan().forward(x, bwd_out),
        )
    } else {
        (
            layer.forward_scan().forward(x, fwd_out),
            layer.backward_scan().forward(x, bwd_out),
        )
    };
    let (fwd, bwd) = (fwd?, bwd?);
    let merged = layer.merge().forward(&fwd, &bwd, None)?;
    buffers.forward = Some(fwd);
    buffers.backward = Some(bwd);
    Ok(merged)
}

/// Runs a sequence of bidirectional layers.
fn bidirectional_stack(
    layers: &[BiLayer],
    input: Matrix,
    parallel: bool,
) -> Result<Matrix, LayerError> {
    let mut buffers = ScanBuffers::default();
    layers
        .iter()
        .try_fold(input, |x, layer| bidirectional(layer, &x, &mut buffers, parallel))
}

/// Keeps `buf` only if it already has the requested shape.
fn reusable(buf: Option<Matrix>, rows: usize, cols: usize) -> Option<Matrix> {
    buf.filter(|m| m.rows() == rows && m.cols() == cols)
}
