// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model families and their fixed architectures.
//!
//! A family names one fixed computation graph. The set of families is
//! closed: every family is a variant of [`ModelFamily`] (posterior and
//! transition graphs over raw signal) or [`SquiggleFamily`] (signal
//! prediction from a symbol sequence). There is no invalid variant, so
//! dispatch on a family can never fail; only parsing a name can.

use crate::ModelError;
use nn_layers::{Activation, Direction};
use std::fmt;
use std::str::FromStr;

// ── Architecture description ───────────────────────────────────────

/// Recurrent cell used by a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Gru,
    Lstm,
}

/// How the recurrent layers of a family are wired together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Each layer runs a forward and a backward scan over the same input
    /// and merges them with a tanh feed-forward layer.
    Bidirectional,
    /// Single scans that alternate direction, starting backward.
    Chained,
    /// As [`Topology::Chained`], with each layer's input added to its output.
    Residual,
}

/// What the final layer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Per-step probabilities over output symbols (softmax head).
    Posterior,
    /// Globally normalised log transition scores (CRF head). Log space only.
    Transitions,
}

/// Layer widths of a posterior or transition network.
///
/// These determine the shapes of synthetic weights. Weights loaded from
/// disk carry their own shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dims {
    /// Samples covered by the input convolution.
    pub conv_width: usize,
    /// Output channels of the input convolution.
    pub features: usize,
    /// Hidden-state width of every recurrent layer.
    pub size: usize,
    /// Rows of the output (symbols, or squared states for transitions).
    pub outputs: usize,
}

/// The fixed architecture of a [`ModelFamily`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilySpec {
    pub stride: usize,
    pub activation: Activation,
    pub cell: CellKind,
    pub depth: usize,
    pub topology: Topology,
    pub output: OutputKind,
    pub dims: Dims,
}

impl FamilySpec {
    /// Direction of the `index`-th layer of a chained or residual stack.
    pub fn layer_direction(index: usize) -> Direction {
        if index % 2 == 0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Returns the same architecture with every recurrent layer (and, for
    /// residual stacks, the convolution) narrowed to `size`.
    pub fn with_size(mut self, size: usize) -> Self {
        self.dims.size = size;
        if self.topology == Topology::Residual {
            self.dims.features = size;
        }
        self
    }
}

// ── Posterior families ─────────────────────────────────────────────

/// Networks mapping a raw signal to per-step posteriors or transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ModelFamily {
    #[serde(rename = "raw_r94")]
    RawR94,
    #[serde(rename = "rgr_r94")]
    RgrR94,
    #[serde(rename = "rgrgr_r94")]
    RgrgrR94,
    #[serde(rename = "rgrgr_r95")]
    RgrgrR95,
    #[serde(rename = "rgrgr_r10")]
    RgrgrR10,
    #[serde(rename = "rnnrf_r94")]
    RnnrfR94,
    #[serde(rename = "rgrgr_resgru")]
    RgrgrResgru,
    #[serde(rename = "rgrgr_reslstm")]
    RgrgrReslstm,
}

const POSTERIOR_DIMS: Dims = Dims {
    conv_width: 11,
    features: 96,
    size: 96,
    outputs: 5,
};

impl ModelFamily {
    /// Every family, in registry order.
    pub const ALL: [ModelFamily; 8] = [
        Self::RawR94,
        Self::RgrR94,
        Self::RgrgrR94,
        Self::RgrgrR95,
        Self::RgrgrR10,
        Self::RnnrfR94,
        Self::RgrgrResgru,
        Self::RgrgrReslstm,
    ];

    /// Canonical model name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RawR94 => "raw_r94",
            Self::RgrR94 => "rgr_r94",
            Self::RgrgrR94 => "rgrgr_r94",
            Self::RgrgrR95 => "rgrgr_r95",
            Self::RgrgrR10 => "rgrgr_r10",
            Self::RnnrfR94 => "rnnrf_r94",
            Self::RgrgrResgru => "rgrgr_resgru",
            Self::RgrgrReslstm => "rgrgr_reslstm",
        }
    }

    /// Samples consumed per output column.
    pub fn stride(&self) -> usize {
        self.spec().stride
    }

    /// Output convention of the family.
    pub fn output(&self) -> OutputKind {
        self.spec().output
    }

    /// The fixed architecture of this family.
    pub fn spec(&self) -> FamilySpec {
        use Activation::{Elu, Tanh};
        use CellKind::{Gru, Lstm};
        use Topology::{Bidirectional, Chained, Residual};

        let (stride, activation, cell, depth, topology, output, dims) = match self {
            Self::RawR94 => (2, Tanh, Gru, 2, Bidirectional, OutputKind::Posterior, POSTERIOR_DIMS),
            Self::RgrR94 => (2, Elu, Gru, 3, Chained, OutputKind::Posterior, POSTERIOR_DIMS),
            Self::RgrgrR94 => (
                5,
                Elu,
                Gru,
                5,
                Chained,
                OutputKind::Posterior,
                Dims {
                    conv_width: 19,
                    ..POSTERIOR_DIMS
                },
            ),
            Self::RgrgrR95 | Self::RgrgrR10 => (
                5,
                Tanh,
                Gru,
                5,
                Chained,
                OutputKind::Posterior,
                Dims {
                    conv_width: 19,
                    ..POSTERIOR_DIMS
                },
            ),
            Self::RnnrfR94 => (
                2,
                Elu,
                Gru,
                5,
                Residual,
                OutputKind::Transitions,
                Dims {
                    outputs: 25,
                    ..POSTERIOR_DIMS
                },
            ),
            Self::RgrgrResgru => (2, Elu, Gru, 5, Residual, OutputKind::Posterior, POSTERIOR_DIMS),
            Self::RgrgrReslstm => (2, Elu, Lstm, 5, Residual, OutputKind::Posterior, POSTERIOR_DIMS),
        };
        FamilySpec {
            stride,
            activation,
            cell,
            depth,
            topology,
            output,
            dims,
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelFamily {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| ModelError::UnknownModel { name: s.to_string() })
    }
}

// ── Signal-prediction families ─────────────────────────────────────

/// Networks mapping a symbol sequence to an expected signal trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SquiggleFamily {
    #[serde(rename = "squiggle_r94")]
    R94,
    #[serde(rename = "squiggle_r10")]
    R10,
}

/// Layer widths of a signal-prediction network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SquiggleDims {
    /// Distinct input symbols.
    pub symbols: usize,
    /// Rows of each embedding column.
    pub embed_dim: usize,
    /// Columns covered by each convolution.
    pub conv_width: usize,
    /// Channels of the hidden convolutions.
    pub features: usize,
    /// Output channels: current level, log spread and transformed dwell.
    pub outputs: usize,
}

impl SquiggleFamily {
    pub const ALL: [SquiggleFamily; 2] = [Self::R94, Self::R10];

    /// Convolutions in every signal-prediction network.
    pub const NUM_CONVS: usize = 6;

    pub fn name(&self) -> &'static str {
        match self {
            Self::R94 => "squiggle_r94",
            Self::R10 => "squiggle_r10",
        }
    }

    pub fn dims(&self) -> SquiggleDims {
        match self {
            Self::R94 => SquiggleDims {
                symbols: 4,
                embed_dim: 16,
                conv_width: 11,
                features: 32,
                outputs: 3,
            },
            Self::R10 => SquiggleDims {
                symbols: 4,
                embed_dim: 16,
                conv_width: 9,
                features: 48,
                outputs: 3,
            },
        }
    }
}

impl fmt::Display for SquiggleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SquiggleFamily {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| ModelError::UnknownSquiggleModel { name: s.to_string() })
    }
}

// ── Event-based network ────────────────────────────────────────────

/// Layer widths of the event-based bidirectional LSTM network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventDims {
    /// Features per event.
    pub features: usize,
    /// Neighbouring events stacked into each input column.
    pub window: usize,
    /// Hidden-state width of every LSTM.
    pub size: usize,
    /// Rows of the posterior.
    pub outputs: usize,
}

impl Default for EventDims {
    fn default() -> Self {
        Self {
            features: 4,
            window: 3,
            size: 64,
            outputs: 5,
        }
    }
}

/// Name under which the event-based network is stored and registered.
pub const EVENTS_MODEL_NAME: &str = "events";

/// Any stored model kind, as named in a model manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyFamily {
    Posterior(ModelFamily),
    Squiggle(SquiggleFamily),
    Events,
}

impl AnyFamily {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Posterior(f) => f.name(),
            Self::Squiggle(f) => f.name(),
            Self::Events => EVENTS_MODEL_NAME,
        }
    }
}

impl fmt::Display for AnyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnyFamily {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == EVENTS_MODEL_NAME {
            return Ok(Self::Events);
        }
        if let Ok(f) = s.parse::<ModelFamily>() {
            return Ok(Self::Posterior(f));
        }
        if let Ok(f) = s.parse::<SquiggleFamily>() {
            return Ok(Self::Squiggle(f));
        }
        Err(ModelError::UnknownModel { name: s.to_string() })
    }
}
