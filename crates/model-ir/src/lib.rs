// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! The closed set of model families and the weight bundles their fixed
//! graphs run on.
//!
//! - [`ModelFamily`] / [`SquiggleFamily`]: every known network, with its
//!   name, stride and architecture ([`FamilySpec`]).
//! - [`PosteriorWeights`], [`SquiggleWeights`], [`EventWeights`]:
//!   shape-validated weight bundles.
//! - [`ModelLoader`]: loads and saves model directories (JSON manifest +
//!   SafeTensors weights).
//! - [`synthetic_posterior`] and friends: deterministic random bundles.
//!
//! # Supported Model Format
//! A model is stored as:
//! - `model.json`: manifest naming the family.
//! - `model.safetensors`: `f32` weights named as described in [`weights`].
//!
//! # Example
//! ```no_run
//! use model_ir::{ModelLoader, ModelWeights};
//! use std::path::Path;
//!
//! let model = ModelLoader::load(Path::new("./models/rgr_r94")).unwrap();
//! if let ModelWeights::Posterior(w) = &model.weights {
//!     println!("{} outputs per step, stride {}", w.num_outputs(), w.family().stride());
//! }
//! ```

mod error;
pub mod family;
mod loader;
mod manifest;
mod synthetic;
pub mod weights;

pub use error::ModelError;
pub use family::{
    AnyFamily, CellKind, Dims, EventDims, FamilySpec, ModelFamily, OutputKind, SquiggleDims,
    SquiggleFamily, Topology, EVENTS_MODEL_NAME,
};
pub use loader::{LoadedModel, ModelLoader, MANIFEST_FILE, WEIGHTS_FILE};
pub use manifest::ModelManifest;
pub use synthetic::{synthetic_events, synthetic_posterior, synthetic_squiggle};
pub use weights::{
    BiLayer, EventWeights, ModelWeights, PosteriorWeights, RecurrentLayer, RecurrentStack,
    SquiggleWeights,
};
