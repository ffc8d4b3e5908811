// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from manifest + SafeTensors files.
//!
//! A model directory contains:
//! - `model.json`: the manifest (see [`ModelManifest`]).
//! - `model.safetensors`: the weights in HuggingFace SafeTensors format.
//!
//! Tensors are little-endian `f32`. A two-dimensional tensor of shape
//! `[cols, rows]` stored row-major is exactly the column-major layout of a
//! `rows × cols` matrix, so weights are copied straight into padded
//! columns. One-dimensional tensors are column vectors.

use crate::family::EventDims;
use crate::{
    AnyFamily, EventWeights, ModelError, ModelManifest, ModelWeights, PosteriorWeights,
    SquiggleWeights,
};
use matrix_core::Matrix;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default manifest filename.
pub const MANIFEST_FILE: &str = "model.json";

/// Default SafeTensors filename.
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// A model read from disk: its manifest and validated weights.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub manifest: ModelManifest,
    pub weights: ModelWeights,
}

/// Named matrices awaiting assembly into a weight bundle.
#[derive(Debug, Default)]
pub(crate) struct TensorStore {
    tensors: HashMap<String, Matrix>,
}

impl TensorStore {
    pub(crate) fn insert(&mut self, name: impl Into<String>, m: Matrix) {
        self.tensors.insert(name.into(), m);
    }

    pub(crate) fn take(&mut self, name: &str) -> Result<Matrix, ModelError> {
        self.tensors
            .remove(name)
            .ok_or_else(|| ModelError::WeightNotFound {
                name: name.to_string(),
            })
    }

    fn leftover(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tensors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Loads and saves model directories.
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let model = ModelLoader::load(Path::new("./models/rgr_r94")).unwrap();
/// println!("{} ({})", model.manifest.name, model.weights.family());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates a model from the given directory.
    ///
    /// Steps:
    /// 1. Parse `model.json` and resolve the family.
    /// 2. Memory-map `model.safetensors` and copy every tensor into a
    ///    padded matrix.
    /// 3. Assemble the family's weight bundle, validating every shape.
    pub fn load(model_dir: &Path) -> Result<LoadedModel, ModelError> {
        let manifest = ModelManifest::from_file(&model_dir.join(MANIFEST_FILE))?;
        let family = manifest.family()?;
        let mut store = Self::read_tensors(&model_dir.join(WEIGHTS_FILE))?;
        let weights = Self::assemble(&manifest, family, &mut store)?;

        let leftover = store.leftover();
        if !leftover.is_empty() {
            warn!(
                model = %manifest.name,
                "ignoring {} unused tensors: {}",
                leftover.len(),
                leftover.join(", ")
            );
        }
        info!(
            model = %manifest.name,
            %family,
            parameters = weights.num_parameters(),
            "model loaded"
        );
        Ok(LoadedModel { manifest, weights })
    }

    /// Writes `weights` and a manifest named `name` into `model_dir`,
    /// creating the directory if needed.
    pub fn save(model_dir: &Path, name: &str, weights: &ModelWeights) -> Result<(), ModelError> {
        std::fs::create_dir_all(model_dir)?;

        let mut manifest = ModelManifest::new(name, weights.family());
        if let ModelWeights::Events(ev) = weights {
            manifest.features = Some(ev.features());
            manifest.window = Some(ev.window());
        }
        std::fs::write(model_dir.join(MANIFEST_FILE), manifest.to_json()?)?;

        let tensors = weights.tensors();
        let encoded: Vec<(String, Vec<usize>, Vec<u8>)> = tensors
            .iter()
            .map(|(tname, m)| (tname.clone(), tensor_shape(m), encode_f32(m)))
            .collect();
        let views = encoded
            .iter()
            .map(|(tname, shape, bytes)| {
                safetensors::tensor::TensorView::new(safetensors::Dtype::F32, shape.clone(), bytes)
                    .map(|view| (tname.as_str(), view))
                    .map_err(|e| ModelError::SafeTensorsError(format!("tensor '{tname}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        safetensors::serialize_to_file(views, &None, &model_dir.join(WEIGHTS_FILE))
            .map_err(|e| ModelError::SafeTensorsError(format!("write failed: {e}")))?;

        info!(model = name, dir = %model_dir.display(), tensors = tensors.len(), "model saved");
        Ok(())
    }

    fn assemble(
        manifest: &ModelManifest,
        family: AnyFamily,
        store: &mut TensorStore,
    ) -> Result<ModelWeights, ModelError> {
        Ok(match family {
            AnyFamily::Posterior(f) => ModelWeights::Posterior(PosteriorWeights::from_store(f, store)?),
            AnyFamily::Squiggle(f) => ModelWeights::Squiggle(SquiggleWeights::from_store(f, store)?),
            AnyFamily::Events => {
                let defaults = EventDims::default();
                ModelWeights::Events(EventWeights::from_store(
                    manifest.features.unwrap_or(defaults.features),
                    manifest.window.unwrap_or(defaults.window),
                    store,
                )?)
            }
        })
    }

    /// Reads every tensor in a SafeTensors file into padded matrices.
    ///
    /// The file is memory-mapped, so only the bytes of each tensor are
    /// touched while copying.
    fn read_tensors(weights_path: &Path) -> Result<TensorStore, ModelError> {
        let file = std::fs::File::open(weights_path).map_err(|e| {
            ModelError::SafeTensorsError(format!(
                "cannot open '{}': {e}",
                weights_path.display()
            ))
        })?;

        // SAFETY: the map is read-only and dropped before this function
        // returns; every tensor is copied out of it.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ModelError::SafeTensorsError(format!("mmap failed: {e}")))?;

        let tensors = safetensors::SafeTensors::deserialize(&mmap)
            .map_err(|e| ModelError::SafeTensorsError(format!("SafeTensors parse error: {e}")))?;

        let mut store = TensorStore::default();
        for (name, view) in tensors.tensors() {
            if view.dtype() != safetensors::Dtype::F32 {
                return Err(ModelError::invalid(
                    name,
                    format!("unsupported dtype {:?}, expected F32", view.dtype()),
                ));
            }
            let (rows, cols) = match *view.shape() {
                [n] => (n, 1),
                [cols, rows] => (rows, cols),
                ref other => {
                    return Err(ModelError::invalid(
                        name,
                        format!("expected a 1-D or 2-D tensor, got shape {other:?}"),
                    ))
                }
            };
            let values: Vec<f32> = view
                .data()
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            let m = Matrix::from_column_major(rows, cols, &values)
                .map_err(|e| ModelError::invalid(name.as_str(), e.to_string()))?;
            debug!(tensor = %name, shape = %m.shape(), "tensor read");
            store.insert(name, m);
        }
        Ok(store)
    }
}

/// SafeTensors shape of a matrix: vectors are 1-D, everything else
/// `[cols, rows]`.
fn tensor_shape(m: &Matrix) -> Vec<usize> {
    if m.cols() == 1 {
        vec![m.rows()]
    } else {
        vec![m.cols(), m.rows()]
    }
}

fn encode_f32(m: &Matrix) -> Vec<u8> {
    m.to_column_major()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}
