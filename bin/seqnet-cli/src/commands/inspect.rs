// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqnet inspect` command: display a model directory.
//!
//! Loads and validates the manifest and weights, then prints every tensor
//! with its shape.

use std::path::PathBuf;

pub fn execute(model: PathBuf) -> anyhow::Result<()> {
    let loaded = model_ir::ModelLoader::load(&model).map_err(|e| {
        anyhow::anyhow!("failed to load model from '{}': {e}", model.display())
    })?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Model:      {}", loaded.manifest.name);
    println!("  Family:     {}", loaded.weights.family());
    if let Some(desc) = &loaded.manifest.description {
        println!("  About:      {desc}");
    }
    println!("  Parameters: {}", loaded.weights.num_parameters());
    println!();

    // ── Tensors ────────────────────────────────────────────────
    println!("  {:<16} {:>8} {:>8} {:>10}", "Tensor", "Rows", "Cols", "Padded");
    println!("  {}", "-".repeat(46));
    for (name, m) in loaded.weights.tensors() {
        println!(
            "  {:<16} {:>8} {:>8} {:>10}",
            name,
            m.rows(),
            m.cols(),
            m.as_padded_slice().len(),
        );
    }
    println!();
    Ok(())
}
