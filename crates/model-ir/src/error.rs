// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model families, weight bundles and weight files.

use nn_layers::LayerError;

/// Errors that can occur when resolving or loading a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The name does not match any posterior or transition family.
    #[error("unknown model '{name}'")]
    UnknownModel { name: String },

    /// The name does not match any signal-prediction family.
    #[error("unknown squiggle model '{name}'")]
    UnknownSquiggleModel { name: String },

    /// A model file could not be read or written.
    #[error("model file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// A weight tensor required by the family was not found in the weight file.
    #[error("weight tensor not found: {name}")]
    WeightNotFound { name: String },

    /// The SafeTensors file could not be loaded or written.
    #[error("SafeTensors error: {0}")]
    SafeTensorsError(String),

    /// A weight tensor is present but unusable (dtype, rank, or it does not
    /// fit the family's architecture).
    #[error("invalid weights '{name}': {detail}")]
    InvalidWeights { name: String, detail: String },

    /// A layer rejected its parameters.
    #[error(transparent)]
    Layer(#[from] LayerError),
}

impl ModelError {
    pub(crate) fn invalid(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidWeights {
            name: name.into(),
            detail: detail.into(),
        }
    }
}
