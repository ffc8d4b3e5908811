// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The inference engine with a type-state–enforced lifecycle.
//!
//! ```text
//! InferenceEngine<Idle>
//!     │  .load_model() / .with_weights()
//!     ▼
//! InferenceEngine<Ready>
//!     │  .posterior() / .events_posterior() / .squiggle()
//!     ▼
//!   InferenceOutput
//! ```
//!
//! Each state transition consumes the old value and returns a new one,
//! making invalid state sequences a compile error.

use crate::input::{FeatureTable, RawTable};
use crate::{graphs, registry, InferenceMetrics, RuntimeConfig, RuntimeError};
use model_ir::{AnyFamily, LoadedModel, ModelLoader, ModelManifest, ModelWeights};
use nn_layers::Matrix;
use std::time::Instant;
use tracing::info;

// ── Type-state markers ─────────────────────────────────────────

/// Engine is created but no model is loaded.
#[derive(Debug)]
pub struct Idle;

/// A model is loaded and the engine can run it.
#[derive(Debug)]
pub struct Ready {
    model: LoadedModel,
    pool: Option<rayon::ThreadPool>,
}

/// Sealed trait for engine states.
pub trait EngineState: std::fmt::Debug {}
impl EngineState for Idle {}
impl EngineState for Ready {}

// ── Inference output ───────────────────────────────────────────

/// The result of a single call.
#[derive(Debug)]
pub struct InferenceOutput {
    /// The graph's result; `None` for an empty input.
    pub output: Option<Matrix>,
    /// Timing and shape data, when profiling is enabled.
    pub metrics: Option<InferenceMetrics>,
}

// ── Engine ─────────────────────────────────────────────────────

/// The primary inference engine.
///
/// `S` is a type-state marker: a model can only be run once it is loaded.
///
/// # Example
/// ```no_run
/// use runtime::{InferenceEngine, RawTable, RuntimeConfig};
///
/// # fn example() -> Result<(), runtime::RuntimeError> {
/// let engine = InferenceEngine::new(RuntimeConfig::new("./models/rgr_r94")).load_model()?;
/// let out = engine.posterior(&RawTable::new(vec![0.1; 4000]))?;
/// if let Some(metrics) = out.metrics {
///     println!("{}", metrics.summary());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InferenceEngine<S: EngineState = Idle> {
    config: RuntimeConfig,
    state: S,
}

// ── Idle → Ready ───────────────────────────────────────────────

impl InferenceEngine<Idle> {
    /// Creates a new engine from the given configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        info!(model_path = %config.model_path.display(), "engine created");
        Self { config, state: Idle }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Loads the model directory named by the configuration.
    pub fn load_model(self) -> Result<InferenceEngine<Ready>, RuntimeError> {
        self.config.validate()?;
        let model = ModelLoader::load(&self.config.model_path)?;
        self.ready(model)
    }

    /// Uses an in-memory weight bundle instead of a model directory.
    pub fn with_weights(
        self,
        name: impl Into<String>,
        weights: ModelWeights,
    ) -> Result<InferenceEngine<Ready>, RuntimeError> {
        self.config.validate()?;
        let manifest = ModelManifest::new(name, weights.family());
        self.ready(LoadedModel { manifest, weights })
    }

    fn ready(self, model: LoadedModel) -> Result<InferenceEngine<Ready>, RuntimeError> {
        let family = model.weights.family();
        if let Some(expected) = &self.config.model {
            if expected != family.name() {
                return Err(RuntimeError::ConfigError(format!(
                    "configured for model '{expected}' but '{}' holds {family}",
                    model.manifest.name
                )));
            }
        }
        let pool = match self.config.num_threads {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };
        info!(
            model = %model.manifest.name,
            %family,
            threads = ?self.config.num_threads,
            "engine ready"
        );
        Ok(InferenceEngine {
            config: self.config,
            state: Ready { model, pool },
        })
    }
}

// ── Ready: run inference ───────────────────────────────────────

impl InferenceEngine<Ready> {
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The loaded model.
    pub fn model(&self) -> &LoadedModel {
        &self.state.model
    }

    pub fn family(&self) -> AnyFamily {
        self.state.model.weights.family()
    }

    /// Per-step posteriors (or transition scores) for a raw signal.
    ///
    /// # Errors
    /// [`RuntimeError::WrongModelKind`] unless a raw-signal model is loaded,
    /// plus any error the graph reports.
    pub fn posterior(&self, raw: &RawTable) -> Result<InferenceOutput, RuntimeError> {
        let ModelWeights::Posterior(weights) = &self.state.model.weights else {
            return Err(self.wrong_kind("raw signal posteriors"));
        };
        let entry = registry::get_model(weights.family().name())?;
        let options = self.config.posterior_options();
        self.timed(raw.len(), || entry.run(raw, weights, &options))
    }

    /// Per-event posteriors for a feature table.
    pub fn events_posterior(&self, events: &FeatureTable) -> Result<InferenceOutput, RuntimeError> {
        let ModelWeights::Events(weights) = &self.state.model.weights else {
            return Err(self.wrong_kind("event posteriors"));
        };
        let options = self.config.posterior_options();
        self.timed(events.len(), || {
            graphs::events_posterior(events, weights, &options)
        })
    }

    /// Expected signal for a symbol sequence.
    pub fn squiggle(
        &self,
        symbols: &[usize],
        transform_units: bool,
    ) -> Result<InferenceOutput, RuntimeError> {
        let ModelWeights::Squiggle(weights) = &self.state.model.weights else {
            return Err(self.wrong_kind("signal prediction"));
        };
        let entry = registry::get_squiggle_model(weights.family().name())?;
        self.timed(symbols.len(), || entry.run(symbols, weights, transform_units))
    }

    // ── Private helpers ────────────────────────────────────────

    fn wrong_kind(&self, requested: &'static str) -> RuntimeError {
        RuntimeError::WrongModelKind {
            requested,
            loaded: self.family(),
        }
    }

    /// Runs `call` on the engine's pool (if any) and records metrics.
    fn timed<F>(&self, input_len: usize, call: F) -> Result<InferenceOutput, RuntimeError>
    where
        F: FnOnce() -> Result<Option<Matrix>, RuntimeError> + Send,
    {
        let start = Instant::now();
        let output = match &self.state.pool {
            Some(pool) => pool.install(call),
            None => call(),
        }?;

        let metrics = self.config.enable_profiling.then(|| {
            let mut m = InferenceMetrics::new(self.state.model.manifest.name.clone(), input_len);
            m.finalise(start.elapsed(), output.as_ref().map(Matrix::shape));
            info!("{}", m.summary());
            m
        });
        Ok(InferenceOutput { output, metrics })
    }
}
