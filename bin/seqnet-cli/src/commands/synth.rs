// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqnet synth` command: write a model directory with random weights.

use model_ir::{
    synthetic_events, synthetic_posterior, synthetic_squiggle, AnyFamily, EventDims, ModelLoader,
    ModelWeights,
};
use std::path::PathBuf;

pub fn execute(family: &str, out: PathBuf, size: Option<usize>, seed: u64) -> anyhow::Result<()> {
    let family: AnyFamily = family.parse()?;
    let weights = match family {
        AnyFamily::Posterior(f) => {
            let spec = match size {
                Some(n) => f.spec().with_size(n),
                None => f.spec(),
            };
            ModelWeights::Posterior(synthetic_posterior(f, spec.dims, seed)?)
        }
        AnyFamily::Squiggle(f) => {
            let mut dims = f.dims();
            if let Some(n) = size {
                dims.features = n;
            }
            ModelWeights::Squiggle(synthetic_squiggle(f, dims, seed)?)
        }
        AnyFamily::Events => {
            let defaults = EventDims::default();
            let dims = EventDims {
                size: size.unwrap_or(defaults.size),
                ..defaults
            };
            ModelWeights::Events(synthetic_events(dims, seed)?)
        }
    };
    tracing::warn!(%family, seed, "writing random weights; outputs are not meaningful");
    ModelLoader::save(&out, family.name(), &weights)?;
    println!(
        "  Wrote {family} ({} parameters) to {}",
        weights.num_parameters(),
        out.display()
    );
    Ok(())
}
