// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqnet squiggle` command: expected signal for a base sequence.

use runtime::{InferenceEngine, RuntimeConfig};

pub fn execute(config: RuntimeConfig, sequence: &str, transform_units: bool) -> anyhow::Result<()> {
    let symbols = encode_bases(sequence)?;
    let engine = InferenceEngine::new(config).load_model()?;
    let result = engine.squiggle(&symbols, transform_units)?;

    match result.output {
        Some(prediction) => super::write_columns(&prediction, &mut std::io::stdout().lock())?,
        None => eprintln!("  empty sequence, no output"),
    }
    if let Some(metrics) = result.metrics {
        eprintln!("  {}", metrics.summary());
    }
    Ok(())
}

/// Maps `ACGT` (either case) to symbols `0..4`.
fn encode_bases(sequence: &str) -> anyhow::Result<Vec<usize>> {
    sequence
        .chars()
        .enumerate()
        .map(|(i, b)| match b.to_ascii_uppercase() {
            'A' => Ok(0),
            'C' => Ok(1),
            'G' => Ok(2),
            'T' => Ok(3),
            other => anyhow::bail!("invalid base '{other}' at position {i}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bases() {
        assert_eq!(encode_bases("ACgt").unwrap(), vec![0, 1, 2, 3]);
        assert!(encode_bases("ACN").is_err());
        assert!(encode_bases("").unwrap().is_empty());
    }
}
