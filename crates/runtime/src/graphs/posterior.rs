// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Raw-signal networks producing per-step posteriors or transition scores.

use super::{bidirectional_stack, PosteriorOptions};
use crate::input::{features_from_raw, RawTable};
use crate::RuntimeError;
use model_ir::{OutputKind, PosteriorWeights, RecurrentLayer, RecurrentStack};
use nn_layers::{globalnorm, residual_inplace, robustlog_activation_inplace, softmax, LayerError, Matrix};
use tracing::debug;

/// Runs the network described by `weights` over a raw signal.
///
/// The family stored in `weights` fixes the architecture: convolution
/// stride and activation, recurrent topology and output head. Returns
/// `Ok(None)` when the signal window is empty.
///
/// # Errors
/// - [`RuntimeError::LinearTransitions`] if the family emits transition
///   scores and `options.return_log` is false.
/// - [`RuntimeError::InvalidInput`] if `options.min_prob` is outside `[0, 1]`.
pub fn posterior(
    raw: &RawTable,
    weights: &PosteriorWeights,
    options: &PosteriorOptions,
) -> Result<Option<Matrix>, RuntimeError> {
    let family = weights.family();
    let spec = family.spec();
    if spec.output == OutputKind::Transitions && !options.return_log {
        return Err(RuntimeError::LinearTransitions { family });
    }
    options.validate()?;

    let Some(signal) = features_from_raw(raw) else {
        debug!(%family, "empty signal, nothing to do");
        return Ok(None);
    };

    let mut conv = weights.conv().forward(&signal, None)?;
    drop(signal);
    spec.activation.apply(&mut conv);
    debug!(%family, shape = %conv.shape(), activation = %spec.activation, "convolution");

    let hidden = match weights.stack() {
        RecurrentStack::Bidirectional(layers) => {
            bidirectional_stack(layers, conv, options.parallel_scans)?
        }
        RecurrentStack::Chained { layers, residual } => chained(layers, conv, *residual)?,
    };
    debug!(%family, shape = %hidden.shape(), "recurrent stack");

    let head = weights.output();
    let post = match spec.output {
        OutputKind::Posterior => {
            let mut post = softmax(&hidden, head.w(), head.b(), None)?;
            if options.return_log {
                robustlog_activation_inplace(&mut post, options.min_prob)?;
            }
            post
        }
        OutputKind::Transitions => globalnorm(&hidden, head.w(), head.b(), None)?,
    };
    Ok(Some(post))
}

/// Single-direction layers in sequence, each optionally adding its input
/// to its output.
fn chained(layers: &[RecurrentLayer], input: Matrix, residual: bool) -> Result<Matrix, LayerError> {
    layers.iter().try_fold(input, |x, layer| {
        let mut y = layer.forward(&x, None)?;
        if residual {
            residual_inplace(&x, &mut y)?;
        }
        Ok(y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use model_ir::{synthetic_posterior, ModelFamily};

    fn weights(family: ModelFamily) -> PosteriorWeights {
        synthetic_posterior(family, family.spec().with_size(8).dims, 42).unwrap()
    }

    fn signal(n: usize) -> RawTable {
        RawTable::new((0..n).map(|i| ((i as f32) * 0.37).sin()).collect())
    }

    #[test]
    fn test_empty_signal_is_absent() {
        let w = weights(ModelFamily::RgrR94);
        let out = posterior(&signal(0), &w, &PosteriorOptions::default()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_linear_columns_sum_to_one() {
        let w = weights(ModelFamily::RawR94);
        let post = posterior(&signal(60), &w, &PosteriorOptions::linear())
            .unwrap()
            .unwrap();
        assert_eq!(post.rows(), w.num_outputs());
        for col in post.columns() {
            assert_abs_diff_eq!(col.iter().sum::<f32>(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_log_mode_is_floored() {
        let w = weights(ModelFamily::RgrR94);
        let options = PosteriorOptions {
            min_prob: 0.1,
            ..PosteriorOptions::default()
        };
        let post = posterior(&signal(40), &w, &options).unwrap().unwrap();
        let floor = 0.1f32.ln();
        assert!(post.to_column_major().iter().all(|&v| v >= floor && v <= 1e-6));
    }

    #[test]
    fn test_transitions_reject_linear_mode() {
        let w = weights(ModelFamily::RnnrfR94);
        let err = posterior(&signal(40), &w, &PosteriorOptions::linear()).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::LinearTransitions {
                family: ModelFamily::RnnrfR94
            }
        ));
    }

    #[test]
    fn test_serial_and_parallel_scans_agree() {
        let w = weights(ModelFamily::RawR94);
        let parallel = posterior(&signal(50), &w, &PosteriorOptions::default())
            .unwrap()
            .unwrap();
        let serial = posterior(
            &signal(50),
            &w,
            &PosteriorOptions {
                parallel_scans: false,
                ..PosteriorOptions::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_invalid_floor() {
        let w = weights(ModelFamily::RgrR94);
        let options = PosteriorOptions {
            min_prob: 1.5,
            ..PosteriorOptions::default()
        };
        assert!(matches!(
            posterior(&signal(20), &w, &options),
            Err(RuntimeError::InvalidInput(_))
        ));
    }
}
