// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Expected-signal prediction from a symbol sequence.

use crate::RuntimeError;
use model_ir::SquiggleWeights;
use nn_layers::{residual_inplace, Activation, Matrix};
use tracing::debug;

/// Predicts the expected signal for every position of `symbols`.
///
/// Output row 0 is the expected level, row 1 the log spread and row 2 the
/// transformed dwell. With `transform_units` set, rows 1 and 2 are
/// converted to a spread and an expected sample count.
/// Returns `Ok(None)` for an empty sequence.
///
/// # Errors
/// Returns a layer error if a symbol has no embedding.
pub fn squiggle(
    symbols: &[usize],
    weights: &SquiggleWeights,
    transform_units: bool,
) -> Result<Option<Matrix>, RuntimeError> {
    if symbols.is_empty() {
        debug!(family = %weights.family(), "empty sequence, nothing to do");
        return Ok(None);
    }
    let embedded = weights.embedding().forward(symbols, None)?;

    let convs = weights.convs();
    let (last, hidden) = match convs.split_last() {
        Some((last, rest)) if !rest.is_empty() => (last, rest),
        _ => return Err(RuntimeError::InvalidInput("network has too few convolutions".into())),
    };

    let mut x = hidden[0].forward_same(&embedded, None)?;
    drop(embedded);
    Activation::Tanh.apply(&mut x);

    let mut spare = None;
    for conv in &hidden[1..] {
        let mut y = conv.forward_same(&x, spare.take())?;
        Activation::Tanh.apply(&mut y);
        residual_inplace(&x, &mut y)?;
        spare = Some(std::mem::replace(&mut x, y));
    }

    let mut out = last.forward_same(&x, None)?;
    debug!(family = %weights.family(), shape = %out.shape(), "squiggle");
    if transform_units {
        transform_units_inplace(&mut out);
    }
    Ok(Some(out))
}

/// Converts row 1 from log spread to spread and row 2 from transformed
/// dwell to expected samples, once per column.
///
/// Matrices with fewer than three rows are left unchanged.
pub fn transform_units_inplace(prediction: &mut Matrix) {
    if prediction.rows() < 3 {
        return;
    }
    for col in prediction.columns_mut() {
        col[1] = col[1].exp();
        col[2] = (-col[2]).exp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::{synthetic_squiggle, SquiggleFamily};

    #[test]
    fn test_one_column_per_symbol() {
        for family in SquiggleFamily::ALL {
            let w = synthetic_squiggle(family, family.dims(), 5).unwrap();
            let symbols = [0, 1, 2, 3, 3, 2, 1, 0, 2];
            let out = squiggle(&symbols, &w, false).unwrap().unwrap();
            assert_eq!(out.rows(), 3);
            assert_eq!(out.cols(), symbols.len());
            assert!(out.padding_is_zero());
        }
    }

    #[test]
    fn test_transform_applied_once() {
        let family = SquiggleFamily::R94;
        let w = synthetic_squiggle(family, family.dims(), 5).unwrap();
        let symbols = [3, 1, 0, 2, 2];
        let raw = squiggle(&symbols, &w, false).unwrap().unwrap();
        let scaled = squiggle(&symbols, &w, true).unwrap().unwrap();
        for c in 0..symbols.len() {
            assert_eq!(scaled[(0, c)], raw[(0, c)]);
            assert_eq!(scaled[(1, c)], raw[(1, c)].exp());
            assert_eq!(scaled[(2, c)], (-raw[(2, c)]).exp());
            assert!(scaled[(1, c)] > 0.0 && scaled[(2, c)] > 0.0);
        }
    }

    #[test]
    fn test_empty_and_out_of_range() {
        let family = SquiggleFamily::R10;
        let w = synthetic_squiggle(family, family.dims(), 5).unwrap();
        assert!(squiggle(&[], &w, true).unwrap().is_none());
        assert!(matches!(
            squiggle(&[0, 4], &w, true),
            Err(RuntimeError::LayerError(_))
        ));
    }
}
