// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Deterministic synthetic weight bundles.
//!
//! Real weights are trained elsewhere. Synthetic bundles have the exact
//! architecture of a family with uniformly random parameters scaled by
//! `1 / sqrt(fan_in)`, so every graph can be exercised end to end in
//! tests, benchmarks and demos. The same seed always yields the same
//! bundle.

use crate::family::{CellKind, Dims, EventDims, FamilySpec, SquiggleDims, Topology};
use crate::weights::{BiLayer, RecurrentLayer, RecurrentStack};
use crate::{EventWeights, ModelError, ModelFamily, PosteriorWeights, SquiggleFamily, SquiggleWeights};
use matrix_core::Matrix;
use nn_layers::{BiMerge, Cell, Conv1d, Dense, Direction, Embedding, GruCell, LstmCell};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

struct Generator {
    rng: StdRng,
}

impl Generator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn uniform(&mut self, rows: usize, cols: usize, scale: f32) -> Matrix {
        Matrix::from_fn(rows, cols, |_, _| self.rng.gen_range(-scale..=scale))
    }

    fn weight(&mut self, fan_in: usize, fan_out: usize) -> Matrix {
        let scale = 1.0 / (fan_in.max(1) as f32).sqrt();
        self.uniform(fan_in, fan_out, scale)
    }

    fn bias(&mut self, n: usize) -> Matrix {
        self.uniform(n, 1, 0.1)
    }

    fn dense(&mut self, input: usize, output: usize) -> Result<Dense, ModelError> {
        let w = self.weight(input, output);
        let b = self.bias(output);
        Ok(Dense::new(w, b)?)
    }

    fn cell(&mut self, kind: CellKind, size: usize) -> Result<Cell, ModelError> {
        Ok(match kind {
            CellKind::Gru => {
                let sw = self.weight(size, 2 * size);
                let sw2 = self.weight(size, size);
                GruCell::new(sw, sw2)?.into()
            }
            CellKind::Lstm => {
                let sw = self.weight(size, 4 * size);
                let p = self.uniform(3 * size, 1, 0.1);
                LstmCell::new(sw, p)?.into()
            }
        })
    }

    fn recurrent(
        &mut self,
        kind: CellKind,
        input: usize,
        size: usize,
        direction: Direction,
    ) -> Result<RecurrentLayer, ModelError> {
        let gate_rows = match kind {
            CellKind::Gru => 3 * size,
            CellKind::Lstm => 4 * size,
        };
        let projection = self.dense(input, gate_rows)?;
        let cell = self.cell(kind, size)?;
        RecurrentLayer::new(projection, cell, direction)
    }

    fn bilayer(&mut self, kind: CellKind, input: usize, size: usize) -> Result<BiLayer, ModelError> {
        let forward = self.recurrent(kind, input, size, Direction::Forward)?;
        let backward = self.recurrent(kind, input, size, Direction::Backward)?;
        let wf = self.weight(size, size);
        let wb = self.weight(size, size);
        let b = self.bias(size);
        BiLayer::new(forward, backward, BiMerge::new(wf, wb, b)?)
    }

    fn conv(
        &mut self,
        in_channels: usize,
        width: usize,
        out_channels: usize,
        stride: usize,
    ) -> Result<Conv1d, ModelError> {
        let w = self.weight(in_channels * width, out_channels);
        let b = self.bias(out_channels);
        Ok(Conv1d::new(w, b, in_channels, stride)?)
    }
}

/// Builds a random bundle for `family` with the given layer widths.
///
/// Use `family.spec().dims` for the family's native widths, or
/// [`FamilySpec::with_size`] to shrink the recurrent layers.
pub fn synthetic_posterior(
    family: ModelFamily,
    dims: Dims,
    seed: u64,
) -> Result<PosteriorWeights, ModelError> {
    let spec = family.spec();
    let mut g = Generator::new(seed);
    let conv = g.conv(1, dims.conv_width, dims.features, spec.stride)?;

    let stack = match spec.topology {
        Topology::Bidirectional => {
            let mut layers = Vec::with_capacity(spec.depth);
            let mut input = dims.features;
            for _ in 0..spec.depth {
                layers.push(g.bilayer(spec.cell, input, dims.size)?);
                input = dims.size;
            }
            RecurrentStack::Bidirectional(layers)
        }
        Topology::Chained | Topology::Residual => {
            let mut layers = Vec::with_capacity(spec.depth);
            let mut input = dims.features;
            for i in 0..spec.depth {
                layers.push(g.recurrent(
                    spec.cell,
                    input,
                    dims.size,
                    FamilySpec::layer_direction(i),
                )?);
                input = dims.size;
            }
            RecurrentStack::Chained {
                layers,
                residual: spec.topology == Topology::Residual,
            }
        }
    };
    let output = g.dense(dims.size, dims.outputs)?;
    debug!(%family, ?dims, seed, "synthetic posterior weights");
    PosteriorWeights::new(family, conv, stack, output)
}

/// Builds a random signal-prediction bundle.
pub fn synthetic_squiggle(
    family: SquiggleFamily,
    dims: SquiggleDims,
    seed: u64,
) -> Result<SquiggleWeights, ModelError> {
    let mut g = Generator::new(seed);
    let embedding = Embedding::new(g.uniform(dims.embed_dim, dims.symbols, 1.0))?;
    let mut convs = Vec::with_capacity(SquiggleFamily::NUM_CONVS);
    convs.push(g.conv(dims.embed_dim, dims.conv_width, dims.features, 1)?);
    for _ in 1..SquiggleFamily::NUM_CONVS - 1 {
        convs.push(g.conv(dims.features, dims.conv_width, dims.features, 1)?);
    }
    convs.push(g.conv(dims.features, dims.conv_width, dims.outputs, 1)?);
    debug!(%family, ?dims, seed, "synthetic squiggle weights");
    SquiggleWeights::new(family, embedding, convs)
}

/// Builds a random event-based network bundle.
pub fn synthetic_events(dims: EventDims, seed: u64) -> Result<EventWeights, ModelError> {
    let mut g = Generator::new(seed);
    let mut stack = Vec::with_capacity(EventWeights::DEPTH);
    let mut input = dims.features * dims.window;
    for _ in 0..EventWeights::DEPTH {
        stack.push(g.bilayer(CellKind::Lstm, input, dims.size)?);
        input = dims.size;
    }
    let output = g.dense(dims.size, dims.outputs)?;
    debug!(?dims, seed, "synthetic event weights");
    EventWeights::new(dims.features, dims.window, stack, output)
}
