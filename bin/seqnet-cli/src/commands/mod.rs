// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod inspect;
pub mod models;
pub mod posterior;
pub mod squiggle;
pub mod synth;

use anyhow::Context;
use runtime::{Matrix, RuntimeConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the configuration file if given, then applies the model override.
pub fn load_config(path: Option<&Path>, model: Option<PathBuf>) -> anyhow::Result<RuntimeConfig> {
    let mut config = match path {
        Some(p) => RuntimeConfig::from_file(p)?,
        None => RuntimeConfig::default(),
    };
    if let Some(m) = model {
        config.model_path = m;
    }
    Ok(config)
}

/// Writes one line per column, values tab-separated.
pub fn write_columns(m: &Matrix, out: &mut impl Write) -> anyhow::Result<()> {
    for (t, col) in m.columns().enumerate() {
        write!(out, "{t}")?;
        for v in col {
            write!(out, "\t{v:.6}")?;
        }
        writeln!(out)?;
    }
    out.flush().context("failed to write output")?;
    Ok(())
}
