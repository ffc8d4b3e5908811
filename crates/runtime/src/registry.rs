// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The closed table of runnable models.
//!
//! Names resolve to a [`ModelEntry`] or [`SquiggleEntry`]; an unknown name
//! is a [`ModelError`] the caller must handle before any graph runs.

use crate::graphs::{self, PosteriorOptions};
use crate::input::RawTable;
use crate::RuntimeError;
use model_ir::{ModelError, ModelFamily, OutputKind, PosteriorWeights, SquiggleFamily, SquiggleWeights};
use nn_layers::Matrix;

/// Signature shared by every raw-signal graph.
pub type PosteriorFn =
    fn(&RawTable, &PosteriorWeights, &PosteriorOptions) -> Result<Option<Matrix>, RuntimeError>;

/// Signature shared by every signal-prediction graph.
pub type SquiggleFn = fn(&[usize], &SquiggleWeights, bool) -> Result<Option<Matrix>, RuntimeError>;

/// A raw-signal model.
#[derive(Debug, Clone, Copy)]
pub struct ModelEntry {
    pub family: ModelFamily,
    pub stride: usize,
    pub posterior_fn: PosteriorFn,
}

impl ModelEntry {
    const fn new(family: ModelFamily, stride: usize) -> Self {
        Self {
            family,
            stride,
            posterior_fn: graphs::posterior,
        }
    }

    pub fn name(&self) -> &'static str {
        self.family.name()
    }

    /// Whether the model emits transition scores rather than posteriors.
    pub fn is_transitions(&self) -> bool {
        self.family.output() == OutputKind::Transitions
    }

    /// Runs the model's graph.
    ///
    /// # Errors
    /// Returns [`RuntimeError::FamilyMismatch`] if `weights` belong to
    /// another family, and any error the graph reports.
    pub fn run(
        &self,
        raw: &RawTable,
        weights: &PosteriorWeights,
        options: &PosteriorOptions,
    ) -> Result<Option<Matrix>, RuntimeError> {
        if weights.family() != self.family {
            return Err(RuntimeError::FamilyMismatch {
                expected: self.family,
                found: weights.family(),
            });
        }
        (self.posterior_fn)(raw, weights, options)
    }
}

/// A signal-prediction model.
#[derive(Debug, Clone, Copy)]
pub struct SquiggleEntry {
    pub family: SquiggleFamily,
    pub squiggle_fn: SquiggleFn,
}

impl SquiggleEntry {
    pub fn name(&self) -> &'static str {
        self.family.name()
    }

    /// Runs the model's graph.
    pub fn run(
        &self,
        symbols: &[usize],
        weights: &SquiggleWeights,
        transform_units: bool,
    ) -> Result<Option<Matrix>, RuntimeError> {
        if weights.family() != self.family {
            return Err(RuntimeError::InvalidInput(format!(
                "{} graph given weights for {}",
                self.family,
                weights.family()
            )));
        }
        (self.squiggle_fn)(symbols, weights, transform_units)
    }
}

static MODELS: [ModelEntry; 8] = [
    ModelEntry::new(ModelFamily::RawR94, 2),
    ModelEntry::new(ModelFamily::RgrR94, 2),
    ModelEntry::new(ModelFamily::RgrgrR94, 5),
    ModelEntry::new(ModelFamily::RgrgrR95, 5),
    ModelEntry::new(ModelFamily::RgrgrR10, 5),
    ModelEntry::new(ModelFamily::RnnrfR94, 2),
    ModelEntry::new(ModelFamily::RgrgrResgru, 2),
    ModelEntry::new(ModelFamily::RgrgrReslstm, 2),
];

static SQUIGGLE_MODELS: [SquiggleEntry; 2] = [
    SquiggleEntry {
        family: SquiggleFamily::R94,
        squiggle_fn: graphs::squiggle,
    },
    SquiggleEntry {
        family: SquiggleFamily::R10,
        squiggle_fn: graphs::squiggle,
    },
];

/// Every raw-signal model.
pub fn models() -> &'static [ModelEntry] {
    &MODELS
}

/// Every signal-prediction model.
pub fn squiggle_models() -> &'static [SquiggleEntry] {
    &SQUIGGLE_MODELS
}

/// Looks up a raw-signal model by name.
///
/// # Errors
/// Returns [`ModelError::UnknownModel`] for an unregistered name.
pub fn get_model(name: &str) -> Result<&'static ModelEntry, ModelError> {
    MODELS
        .iter()
        .find(|e| e.name() == name)
        .ok_or_else(|| ModelError::UnknownModel {
            name: name.to_string(),
        })
}

/// Looks up a signal-prediction model by name.
///
/// # Errors
/// Returns [`ModelError::UnknownSquiggleModel`] for an unregistered name.
pub fn get_squiggle_model(name: &str) -> Result<&'static SquiggleEntry, ModelError> {
    SQUIGGLE_MODELS
        .iter()
        .find(|e| e.name() == name)
        .ok_or_else(|| ModelError::UnknownSquiggleModel {
            name: name.to_string(),
        })
}

/// Samples consumed per output column by the named model.
pub fn model_stride(name: &str) -> Result<usize, ModelError> {
    get_model(name).map(|e| e.stride)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_family_registered_once() {
        for family in ModelFamily::ALL {
            let entry = get_model(family.name()).unwrap();
            assert_eq!(entry.family, family);
            assert_eq!(entry.stride, family.stride());
        }
        assert_eq!(models().len(), ModelFamily::ALL.len());
        for family in SquiggleFamily::ALL {
            assert_eq!(get_squiggle_model(family.name()).unwrap().family, family);
        }
    }

    #[test]
    fn test_unknown_names() {
        assert!(matches!(
            get_model("rgr_r95"),
            Err(ModelError::UnknownModel { .. })
        ));
        assert!(matches!(
            get_squiggle_model("raw_r94"),
            Err(ModelError::UnknownSquiggleModel { .. })
        ));
        assert!(model_stride("").is_err());
    }

    #[test]
    fn test_transitions_flag() {
        let flagged: Vec<_> = models().iter().filter(|e| e.is_transitions()).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].name(), "rnnrf_r94");
    }
}
