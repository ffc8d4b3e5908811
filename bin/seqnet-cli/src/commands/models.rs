// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `seqnet models` command: list the registry.

use model_ir::{EventDims, EVENTS_MODEL_NAME};
use runtime::registry;

pub fn execute() -> anyhow::Result<()> {
    println!("  {:<16} {:>6}  {:<12} {:<14}", "Model", "Stride", "Output", "Topology");
    println!("  {}", "-".repeat(52));
    for entry in registry::models() {
        let spec = entry.family.spec();
        let output = if entry.is_transitions() {
            "transitions"
        } else {
            "posterior"
        };
        println!(
            "  {:<16} {:>6}  {:<12} {:?} x{} {:?}",
            entry.name(),
            entry.stride,
            output,
            spec.topology,
            spec.depth,
            spec.cell,
        );
    }
    for entry in registry::squiggle_models() {
        let dims = entry.family.dims();
        println!(
            "  {:<16} {:>6}  {:<12} conv x6, width {}",
            entry.name(),
            1,
            "signal",
            dims.conv_width,
        );
    }
    let dims = EventDims::default();
    println!(
        "  {:<16} {:>6}  {:<12} BiLSTM x2, window {}",
        EVENTS_MODEL_NAME, 1, "posterior", dims.window,
    );
    Ok(())
}
