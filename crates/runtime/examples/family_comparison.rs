// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: run every registered family over the same synthetic signal.
//!
//! Shows how stride, topology and output head change the result shape and
//! cost for one input.
//!
//! ```bash
//! cargo run -p runtime --example family_comparison
//! ```

use model_ir::{synthetic_posterior, ModelFamily, ModelWeights};
use runtime::{InferenceEngine, RawTable, RuntimeConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let raw = RawTable::new((0..4000).map(|i| (i as f32 * 0.07).sin()).collect());
    println!("Signal: {} samples\n", raw.len());
    println!(
        "{:<16} {:>6} {:>10} {:>10} {:>10}",
        "Model", "Stride", "Output", "Time ms", "Params"
    );
    println!("{}", "-".repeat(56));

    for family in ModelFamily::ALL {
        let weights = synthetic_posterior(family, family.spec().with_size(32).dims, 7)?;
        let weights = ModelWeights::Posterior(weights);
        let params = weights.num_parameters();
        let engine = InferenceEngine::new(RuntimeConfig::default())
            .with_weights(family.name(), weights)?;
        let out = engine.posterior(&raw)?;
        let shape = out
            .output
            .map(|m| m.shape().to_string())
            .unwrap_or_else(|| "none".into());
        let ms = out
            .metrics
            .map_or(0.0, |m| m.total_duration.as_secs_f64() * 1000.0);
        println!(
            "{:<16} {:>6} {:>10} {:>10.2} {:>10}",
            family.name(),
            family.stride(),
            shape,
            ms,
            params
        );
    }
    Ok(())
}
