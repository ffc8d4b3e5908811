// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # seqnet
//!
//! Command-line interface for the seqnet inference runtime.
//!
//! ## Usage
//! ```bash
//! # List the registered models
//! seqnet models
//!
//! # Write a synthetic model directory
//! seqnet synth --family rgrgr_r94 --out ./models/rgrgr_r94
//!
//! # Per-step posteriors for a raw signal (one sample per token)
//! seqnet posterior --model ./models/rgrgr_r94 --input read.txt
//!
//! # Expected signal for a base sequence
//! seqnet squiggle --model ./models/squiggle_r94 --sequence ACGTTGCA
//!
//! # Inspect a model directory
//! seqnet inspect --model ./models/rgrgr_r94
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "seqnet",
    about = "Padded-matrix neural network inference for sequencing signals",
    version,
    author
)]
struct Cli {
    /// Path to a TOML runtime configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered model with its stride and output kind.
    Models,

    /// Inspect a model directory: manifest, tensors and parameter count.
    Inspect {
        /// Path to the model directory.
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Write a model directory filled with deterministic random weights.
    Synth {
        /// Model name: a raw-signal family, a squiggle family or "events".
        #[arg(short, long)]
        family: String,

        /// Output directory.
        #[arg(short, long)]
        out: PathBuf,

        /// Hidden-state width (defaults to the family's own).
        #[arg(long)]
        size: Option<usize>,

        /// Random seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Per-step posteriors for a raw signal or an event table.
    Posterior {
        /// Path to the model directory (overrides the configuration file).
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Whitespace-separated samples, or one event per line for event models.
        #[arg(short, long)]
        input: PathBuf,

        /// First sample to process.
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// One past the last sample to process (defaults to the end).
        #[arg(long)]
        end: Option<usize>,

        /// Emit probabilities instead of log probabilities.
        #[arg(long)]
        linear: bool,

        /// Probability floor for log output.
        #[arg(long)]
        min_prob: Option<f32>,
    },

    /// Expected signal for a base sequence.
    Squiggle {
        /// Path to the model directory (overrides the configuration file).
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Bases (ACGT) to predict for.
        #[arg(short, long)]
        sequence: String,

        /// Keep the spread and dwell rows in log space.
        #[arg(long)]
        raw_units: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Models => commands::models::execute(),
        Commands::Inspect { model } => commands::inspect::execute(model),
        Commands::Synth {
            family,
            out,
            size,
            seed,
        } => commands::synth::execute(&family, out, size, seed),
        Commands::Posterior {
            model,
            input,
            start,
            end,
            linear,
            min_prob,
        } => {
            let mut config = commands::load_config(cli.config.as_deref(), model)?;
            if linear {
                config.return_log = false;
            }
            if let Some(p) = min_prob {
                config.min_prob = p;
            }
            commands::posterior::execute(config, input, start, end)
        }
        Commands::Squiggle {
            model,
            sequence,
            raw_units,
        } => {
            let config = commands::load_config(cli.config.as_deref(), model)?;
            commands::squiggle::execute(config, &sequence, !raw_units)
        }
    }
}
