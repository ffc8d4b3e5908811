// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The event-based bidirectional LSTM network.

use super::{bidirectional_stack, PosteriorOptions};
use crate::input::FeatureTable;
use crate::RuntimeError;
use model_ir::EventWeights;
use nn_layers::{robustlog_activation_inplace, softmax, window, Matrix};
use tracing::debug;

/// Per-event posteriors from a table of event features.
///
/// Each event is stacked with its neighbours (zero beyond either end),
/// passed through two bidirectional LSTM layers and a softmax head.
/// Returns `Ok(None)` for an empty table.
///
/// # Errors
/// Returns [`RuntimeError::InvalidInput`] if the table's feature count does
/// not match the network or `options.min_prob` is outside `[0, 1]`.
pub fn events_posterior(
    events: &FeatureTable,
    weights: &EventWeights,
    options: &PosteriorOptions,
) -> Result<Option<Matrix>, RuntimeError> {
    options.validate()?;
    if events.is_empty() {
        debug!("no events, nothing to do");
        return Ok(None);
    }
    if events.features() != weights.features() {
        return Err(RuntimeError::InvalidInput(format!(
            "network reads {} features per event, table has {}",
            weights.features(),
            events.features()
        )));
    }

    let windowed = window(&events.to_matrix(), weights.window(), 1)?;
    debug!(shape = %windowed.shape(), "windowed events");
    let hidden = bidirectional_stack(weights.stack(), windowed, options.parallel_scans)?;

    let head = weights.output();
    let mut post = softmax(&hidden, head.w(), head.b(), None)?;
    if options.return_log {
        robustlog_activation_inplace(&mut post, options.min_prob)?;
    }
    Ok(Some(post))
}
