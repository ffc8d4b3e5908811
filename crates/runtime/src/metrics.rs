// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inference profiling metrics.
//!
//! [`InferenceMetrics`] records how long one graph call took, how much
//! input it consumed and what it produced.

use matrix_core::Shape;
use std::time::Duration;

/// Metrics for a single graph call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InferenceMetrics {
    /// Model that ran.
    pub model: String,
    /// Input length: samples, events or symbols.
    pub input_len: usize,
    /// Wall-clock time of the call.
    pub total_duration: Duration,
    /// Shape of the result, `None` if the input was empty.
    pub output_shape: Option<Shape>,
}

impl InferenceMetrics {
    /// Starts metrics for a call on `input_len` items.
    pub fn new(model: impl Into<String>, input_len: usize) -> Self {
        Self {
            model: model.into(),
            input_len,
            total_duration: Duration::ZERO,
            output_shape: None,
        }
    }

    /// Finalises metrics with the total wall-clock time and result shape.
    pub fn finalise(&mut self, total: Duration, output_shape: Option<Shape>) {
        self.total_duration = total;
        self.output_shape = output_shape;
    }

    /// Input items processed per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs <= 0.0 || self.input_len == 0 {
            return 0.0;
        }
        self.input_len as f64 / secs
    }

    /// Output columns produced.
    pub fn output_columns(&self) -> usize {
        self.output_shape.map_or(0, |s| s.cols)
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let output = match self.output_shape {
            Some(shape) => shape.to_string(),
            None => "none".to_string(),
        };
        format!(
            "{}: {:.2}ms, {} inputs -> {} ({:.0} inputs/s)",
            self.model,
            self.total_duration.as_secs_f64() * 1000.0,
            self.input_len,
            output,
            self.throughput(),
        )
    }
}
