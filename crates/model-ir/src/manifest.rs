// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! The manifest (`model.json`) names the family whose fixed graph the
//! weights in `model.safetensors` belong to.
//!
//! # Format
//! ```json
//! {
//!   "name": "rgr-r94-field",
//!   "family": "rgr_r94",
//!   "description": "optional free text"
//! }
//! ```
//! The event-based network (`"family": "events"`) additionally records
//! `features` per event and the `window` width.

use crate::{AnyFamily, ModelError};
use std::path::Path;

/// Model descriptor, deserialized from `model.json`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name.
    pub name: String,
    /// Family name (e.g. `"raw_r94"`, `"squiggle_r10"`, `"events"`).
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Features per event (event-based network only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<usize>,
    /// Events per input window (event-based network only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
}

impl ModelManifest {
    pub fn new(name: impl Into<String>, family: AnyFamily) -> Self {
        Self {
            name: name.into(),
            family: family.name().to_string(),
            description: None,
            features: None,
            window: None,
        }
    }

    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves the family name.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownModel`] if the name is not a known family.
    pub fn family(&self) -> Result<AnyFamily, ModelError> {
        self.family.parse()
    }
}
