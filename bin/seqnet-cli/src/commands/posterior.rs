// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqnet posterior` command: posteriors for a signal or event file.
//!
//! Raw-signal models read whitespace-separated samples. The event model
//! reads one event per line, features separated by whitespace.

use anyhow::Context;
use model_ir::AnyFamily;
use runtime::{FeatureTable, InferenceEngine, RawTable, RuntimeConfig};
use std::path::{Path, PathBuf};

pub fn execute(
    config: RuntimeConfig,
    input: PathBuf,
    start: usize,
    end: Option<usize>,
) -> anyhow::Result<()> {
    let engine = InferenceEngine::new(config).load_model()?;
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("cannot read '{}'", input.display()))?;

    let result = match engine.family() {
        AnyFamily::Events => {
            let table = parse_events(&text, &input)?;
            engine.events_posterior(&table)?
        }
        _ => {
            let samples = parse_floats(text.split_whitespace(), &input)?;
            let end = end.unwrap_or(samples.len());
            engine.posterior(&RawTable::with_window(samples, start, end))?
        }
    };

    match result.output {
        Some(post) => super::write_columns(&post, &mut std::io::stdout().lock())?,
        None => eprintln!("  empty input, no output"),
    }
    if let Some(metrics) = result.metrics {
        eprintln!("  {}", metrics.summary());
    }
    Ok(())
}

fn parse_floats<'a>(tokens: impl Iterator<Item = &'a str>, path: &Path) -> anyhow::Result<Vec<f32>> {
    tokens
        .map(|t| {
            t.parse::<f32>()
                .with_context(|| format!("'{}': '{t}' is not a number", path.display()))
        })
        .collect()
}

fn parse_events(text: &str, path: &Path) -> anyhow::Result<FeatureTable> {
    let events = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| parse_floats(l.split_whitespace(), path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(FeatureTable::from_events(&events)?)
}
