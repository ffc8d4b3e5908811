// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Weight bundles: the immutable parameters of each model graph.
//!
//! A bundle is validated against its family's architecture once, when it
//! is built. Graphs borrow bundles and never mutate them.
//!
//! Every bundle can be flattened into named tensors (see
//! [`PosteriorWeights::tensors`]) and rebuilt from them (see
//! [`crate::ModelLoader`]). Tensor names follow one scheme:
//!
//! | tensor               | meaning                                        |
//! |----------------------|------------------------------------------------|
//! | `conv.W`, `conv.b`   | input convolution                              |
//! | `rnn{i}.iW`, `.b`    | input projection of chained layer `i`          |
//! | `rnn{i}.sW`, `.sW2`  | GRU state weights of chained layer `i`         |
//! | `rnn{i}.sW`, `.p`    | LSTM state weights and peepholes               |
//! | `fwd{i}.*`, `bwd{i}.*` | forward/backward scans of bidirectional layer `i` |
//! | `merge{i}.Wf/Wb/b`   | merge of bidirectional layer `i`               |
//! | `out.W`, `out.b`     | output head                                    |
//! | `embed.W`            | symbol embedding                               |
//! | `conv{k}.W/b`        | `k`-th convolution of a signal predictor (1-based) |

use crate::family::{CellKind, FamilySpec, OutputKind, Topology};
use crate::loader::TensorStore;
use crate::{ModelError, ModelFamily, SquiggleFamily};
use matrix_core::Matrix;
use nn_layers::{
    BiMerge, Cell, Conv1d, Dense, Direction, Embedding, GruCell, LayerError, LstmCell,
    RecurrentCell,
};

// ── Recurrent building blocks ──────────────────────────────────────

/// An input projection followed by a recurrent scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrentLayer {
    input: Dense,
    cell: Cell,
    direction: Direction,
}

impl RecurrentLayer {
    /// Checks that the projection produces exactly the gate rows the cell
    /// consumes.
    pub fn new(input: Dense, cell: Cell, direction: Direction) -> Result<Self, ModelError> {
        if input.output_size() != cell.gate_rows() {
            return Err(ModelError::invalid(
                "recurrent layer",
                format!(
                    "input projection yields {} rows, cell expects {}",
                    input.output_size(),
                    cell.gate_rows()
                ),
            ));
        }
        Ok(Self {
            input,
            cell,
            direction,
        })
    }

    pub fn input(&self) -> &Dense {
        &self.input
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn input_size(&self) -> usize {
        self.input.input_size()
    }

    pub fn size(&self) -> usize {
        self.cell.size()
    }

    fn cell_kind(&self) -> CellKind {
        match self.cell {
            Cell::Gru(_) => CellKind::Gru,
            Cell::Lstm(_) => CellKind::Lstm,
        }
    }

    /// Projects `x` and scans the result.
    pub fn forward(&self, x: &Matrix, out: Option<Matrix>) -> Result<Matrix, LayerError> {
        let gates = self.input.forward(x, None)?;
        self.cell.scan(&gates, self.direction, out)
    }

    fn collect<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Matrix)>) {
        out.push((format!("{prefix}.iW"), self.input.w()));
        out.push((format!("{prefix}.b"), self.input.b()));
        match &self.cell {
            Cell::Gru(c) => {
                out.push((format!("{prefix}.sW"), c.sw()));
                out.push((format!("{prefix}.sW2"), c.sw2()));
            }
            Cell::Lstm(c) => {
                out.push((format!("{prefix}.sW"), c.sw()));
                out.push((format!("{prefix}.p"), c.peephole()));
            }
        }
    }

    fn take(
        store: &mut TensorStore,
        prefix: &str,
        kind: CellKind,
        direction: Direction,
    ) -> Result<Self, ModelError> {
        let input = Dense::new(
            store.take(&format!("{prefix}.iW"))?,
            store.take(&format!("{prefix}.b"))?,
        )?;
        let sw = store.take(&format!("{prefix}.sW"))?;
        let cell = match kind {
            CellKind::Gru => GruCell::new(sw, store.take(&format!("{prefix}.sW2"))?)?.into(),
            CellKind::Lstm => LstmCell::new(sw, store.take(&format!("{prefix}.p"))?)?.into(),
        };
        Self::new(input, cell, direction)
    }
}

/// A forward scan and a backward scan over the same input, merged.
#[derive(Debug, Clone, PartialEq)]
pub struct BiLayer {
    forward: RecurrentLayer,
    backward: RecurrentLayer,
    merge: BiMerge,
}

impl BiLayer {
    pub fn new(
        forward: RecurrentLayer,
        backward: RecurrentLayer,
        merge: BiMerge,
    ) -> Result<Self, ModelError> {
        if forward.direction() != Direction::Forward || backward.direction() != Direction::Backward
        {
            return Err(ModelError::invalid(
                "bidirectional layer",
                "scans must run forward and backward",
            ));
        }
        if forward.input_size() != backward.input_size() {
            return Err(ModelError::invalid(
                "bidirectional layer",
                format!(
                    "scan inputs differ: {} vs {}",
                    forward.input_size(),
                    backward.input_size()
                ),
            ));
        }
        if merge.wf().rows() != forward.size() || merge.wb().rows() != backward.size() {
            return Err(ModelError::invalid(
                "bidirectional layer",
                format!(
                    "merge weights {} / {} do not match scan sizes {} / {}",
                    merge.wf().shape(),
                    merge.wb().shape(),
                    forward.size(),
                    backward.size()
                ),
            ));
        }
        Ok(Self {
            forward,
            backward,
            merge,
        })
    }

    pub fn forward_scan(&self) -> &RecurrentLayer {
        &self.forward
    }

    pub fn backward_scan(&self) -> &RecurrentLayer {
        &self.backward
    }

    pub fn merge(&self) -> &BiMerge {
        &self.merge
    }

    pub fn input_size(&self) -> usize {
        self.forward.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.merge.output_size()
    }

    fn cell_kind(&self) -> CellKind {
        self.forward.cell_kind()
    }

    fn collect<'a>(&'a self, index: usize, out: &mut Vec<(String, &'a Matrix)>) {
        self.forward.collect(&format!("fwd{index}"), out);
        self.backward.collect(&format!("bwd{index}"), out);
        out.push((format!("merge{index}.Wf"), self.merge.wf()));
        out.push((format!("merge{index}.Wb"), self.merge.wb()));
        out.push((format!("merge{index}.b"), self.merge.b()));
    }

    fn take(store: &mut TensorStore, index: usize, kind: CellKind) -> Result<Self, ModelError> {
        let forward = RecurrentLayer::take(store, &format!("fwd{index}"), kind, Direction::Forward)?;
        let backward =
            RecurrentLayer::take(store, &format!("bwd{index}"), kind, Direction::Backward)?;
        let merge = BiMerge::new(
            store.take(&format!("merge{index}.Wf"))?,
            store.take(&format!("merge{index}.Wb"))?,
            store.take(&format!("merge{index}.b"))?,
        )?;
        Self::new(forward, backward, merge)
    }
}

fn check_bi_chain(layers: &[BiLayer], input: usize, what: &str) -> Result<usize, ModelError> {
    let mut width = input;
    for (i, layer) in layers.iter().enumerate() {
        if layer.input_size() != width {
            return Err(ModelError::invalid(
                what,
                format!("layer {i} expects {} inputs, receives {width}", layer.input_size()),
            ));
        }
        width = layer.output_size();
    }
    Ok(width)
}

/// The recurrent part of a posterior network.
#[derive(Debug, Clone, PartialEq)]
pub enum RecurrentStack {
    /// Bidirectional layers, each merged with a tanh feed-forward layer.
    Bidirectional(Vec<BiLayer>),
    /// Single-direction layers applied one after another. With `residual`
    /// set, each layer's input is added to its output.
    Chained {
        layers: Vec<RecurrentLayer>,
        residual: bool,
    },
}

impl RecurrentStack {
    pub fn depth(&self) -> usize {
        match self {
            Self::Bidirectional(layers) => layers.len(),
            Self::Chained { layers, .. } => layers.len(),
        }
    }

    fn topology(&self) -> Topology {
        match self {
            Self::Bidirectional(_) => Topology::Bidirectional,
            Self::Chained { residual: false, .. } => Topology::Chained,
            Self::Chained { residual: true, .. } => Topology::Residual,
        }
    }

    /// Validates the internal wiring and returns the output width.
    fn check(&self, input: usize) -> Result<usize, ModelError> {
        match self {
            Self::Bidirectional(layers) => check_bi_chain(layers, input, "recurrent stack"),
            Self::Chained { layers, residual } => {
                let mut width = input;
                for (i, layer) in layers.iter().enumerate() {
                    if layer.input_size() != width {
                        return Err(ModelError::invalid(
                            "recurrent stack",
                            format!(
                                "layer {i} expects {} inputs, receives {width}",
                                layer.input_size()
                            ),
                        ));
                    }
                    if *residual && layer.size() != width {
                        return Err(ModelError::invalid(
                            "recurrent stack",
                            format!(
                                "residual layer {i} maps {width} rows to {}",
                                layer.size()
                            ),
                        ));
                    }
                    if layer.direction() != FamilySpec::layer_direction(i) {
                        return Err(ModelError::invalid(
                            "recurrent stack",
                            format!("layer {i} runs {:?}", layer.direction()),
                        ));
                    }
                    width = layer.size();
                }
                Ok(width)
            }
        }
    }

    fn cell_kinds(&self) -> Vec<CellKind> {
        match self {
            Self::Bidirectional(layers) => layers
                .iter()
                .flat_map(|l| [l.forward.cell_kind(), l.backward.cell_kind()])
                .collect(),
            Self::Chained { layers, .. } => layers.iter().map(RecurrentLayer::cell_kind).collect(),
        }
    }
}

// ── Posterior / transition networks ────────────────────────────────

/// Weights of a [`ModelFamily`] network.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorWeights {
    family: ModelFamily,
    conv: Conv1d,
    stack: RecurrentStack,
    output: Dense,
}

impl PosteriorWeights {
    /// Validates the bundle against the architecture of `family`.
    pub fn new(
        family: ModelFamily,
        conv: Conv1d,
        stack: RecurrentStack,
        output: Dense,
    ) -> Result<Self, ModelError> {
        let spec = family.spec();
        let name = family.name();
        if conv.in_channels() != 1 || conv.stride() != spec.stride {
            return Err(ModelError::invalid(
                name,
                format!(
                    "convolution must read 1 channel with stride {}, got {} channels stride {}",
                    spec.stride,
                    conv.in_channels(),
                    conv.stride()
                ),
            ));
        }
        if stack.topology() != spec.topology || stack.depth() != spec.depth {
            return Err(ModelError::invalid(
                name,
                format!(
                    "expected {:?} stack of depth {}, got {:?} of depth {}",
                    spec.topology,
                    spec.depth,
                    stack.topology(),
                    stack.depth()
                ),
            ));
        }
        if stack.cell_kinds().iter().any(|&k| k != spec.cell) {
            return Err(ModelError::invalid(
                name,
                format!("every recurrent cell must be {:?}", spec.cell),
            ));
        }
        let width = stack.check(conv.out_channels())?;
        if output.input_size() != width {
            return Err(ModelError::invalid(
                name,
                format!(
                    "output head expects {} inputs, stack yields {width}",
                    output.input_size()
                ),
            ));
        }
        if spec.output == OutputKind::Transitions {
            let n = output.output_size();
            let nstate = (n as f64).sqrt().round() as usize;
            if nstate == 0 || nstate * nstate != n {
                return Err(ModelError::invalid(
                    name,
                    format!("{n} transition outputs is not a square number of states"),
                ));
            }
        }
        Ok(Self {
            family,
            conv,
            stack,
            output,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn conv(&self) -> &Conv1d {
        &self.conv
    }

    pub fn stack(&self) -> &RecurrentStack {
        &self.stack
    }

    pub fn output(&self) -> &Dense {
        &self.output
    }

    /// Rows of every output column.
    pub fn num_outputs(&self) -> usize {
        self.output.output_size()
    }

    /// All weight matrices under their tensor names.
    pub fn tensors(&self) -> Vec<(String, &Matrix)> {
        let mut out = vec![
            ("conv.W".to_string(), self.conv.w()),
            ("conv.b".to_string(), self.conv.b()),
        ];
        match &self.stack {
            RecurrentStack::Bidirectional(layers) => {
                for (i, layer) in layers.iter().enumerate() {
                    layer.collect(i, &mut out);
                }
            }
            RecurrentStack::Chained { layers, .. } => {
                for (i, layer) in layers.iter().enumerate() {
                    layer.collect(&format!("rnn{i}"), &mut out);
                }
            }
        }
        out.push(("out.W".to_string(), self.output.w()));
        out.push(("out.b".to_string(), self.output.b()));
        out
    }

    pub(crate) fn from_store(
        family: ModelFamily,
        store: &mut TensorStore,
    ) -> Result<Self, ModelError> {
        let spec = family.spec();
        let conv = Conv1d::new(store.take("conv.W")?, store.take("conv.b")?, 1, spec.stride)?;
        let stack = match spec.topology {
            Topology::Bidirectional => RecurrentStack::Bidirectional(
                (0..spec.depth)
                    .map(|i| BiLayer::take(store, i, spec.cell))
                    .collect::<Result<_, _>>()?,
            ),
            Topology::Chained | Topology::Residual => RecurrentStack::Chained {
                layers: (0..spec.depth)
                    .map(|i| {
                        RecurrentLayer::take(
                            store,
                            &format!("rnn{i}"),
                            spec.cell,
                            FamilySpec::layer_direction(i),
                        )
                    })
                    .collect::<Result<_, _>>()?,
                residual: spec.topology == Topology::Residual,
            },
        };
        let output = Dense::new(store.take("out.W")?, store.take("out.b")?)?;
        Self::new(family, conv, stack, output)
    }
}

// ── Signal prediction networks ─────────────────────────────────────

/// Weights of a [`SquiggleFamily`] network: an embedding and six
/// same-padded convolutions, the middle four wrapped in residual
/// connections.
#[derive(Debug, Clone, PartialEq)]
pub struct SquiggleWeights {
    family: SquiggleFamily,
    embedding: Embedding,
    convs: Vec<Conv1d>,
}

impl SquiggleWeights {
    pub fn new(
        family: SquiggleFamily,
        embedding: Embedding,
        convs: Vec<Conv1d>,
    ) -> Result<Self, ModelError> {
        let name = family.name();
        if convs.len() != SquiggleFamily::NUM_CONVS {
            return Err(ModelError::invalid(
                name,
                format!(
                    "expected {} convolutions, got {}",
                    SquiggleFamily::NUM_CONVS,
                    convs.len()
                ),
            ));
        }
        let mut width = embedding.dim();
        for (k, conv) in convs.iter().enumerate() {
            if conv.in_channels() != width || conv.stride() != 1 {
                return Err(ModelError::invalid(
                    name,
                    format!(
                        "convolution {} must read {width} channels with stride 1",
                        k + 1
                    ),
                ));
            }
            let residual = (1..SquiggleFamily::NUM_CONVS - 1).contains(&k);
            if residual && conv.out_channels() != width {
                return Err(ModelError::invalid(
                    name,
                    format!(
                        "residual convolution {} maps {width} channels to {}",
                        k + 1,
                        conv.out_channels()
                    ),
                ));
            }
            width = conv.out_channels();
        }
        if width < 3 {
            return Err(ModelError::invalid(
                name,
                format!("final convolution yields {width} channels, need at least 3"),
            ));
        }
        Ok(Self {
            family,
            embedding,
            convs,
        })
    }

    pub fn family(&self) -> SquiggleFamily {
        self.family
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn convs(&self) -> &[Conv1d] {
        &self.convs
    }

    pub fn num_outputs(&self) -> usize {
        self.convs.last().map_or(0, Conv1d::out_channels)
    }

    pub fn tensors(&self) -> Vec<(String, &Matrix)> {
        let mut out = vec![("embed.W".to_string(), self.embedding.w())];
        for (k, conv) in self.convs.iter().enumerate() {
            out.push((format!("conv{}.W", k + 1), conv.w()));
            out.push((format!("conv{}.b", k + 1), conv.b()));
        }
        out
    }

    pub(crate) fn from_store(
        family: SquiggleFamily,
        store: &mut TensorStore,
    ) -> Result<Self, ModelError> {
        let embedding = Embedding::new(store.take("embed.W")?)?;
        let mut width = embedding.dim();
        let mut convs = Vec::with_capacity(SquiggleFamily::NUM_CONVS);
        for k in 1..=SquiggleFamily::NUM_CONVS {
            let conv = Conv1d::new(
                store.take(&format!("conv{k}.W"))?,
                store.take(&format!("conv{k}.b"))?,
                width,
                1,
            )?;
            width = conv.out_channels();
            convs.push(conv);
        }
        Self::new(family, embedding, convs)
    }
}

// ── Event-based network ────────────────────────────────────────────

/// Weights of the event-based network: two bidirectional LSTM layers over
/// windowed event features, then a softmax head.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWeights {
    features: usize,
    window: usize,
    stack: Vec<BiLayer>,
    output: Dense,
}

impl EventWeights {
    /// Number of bidirectional layers.
    pub const DEPTH: usize = 2;

    pub fn new(
        features: usize,
        window: usize,
        stack: Vec<BiLayer>,
        output: Dense,
    ) -> Result<Self, ModelError> {
        if features == 0 || window == 0 {
            return Err(ModelError::invalid(
                "events",
                "feature count and window must be positive",
            ));
        }
        if stack.len() != Self::DEPTH {
            return Err(ModelError::invalid(
                "events",
                format!("expected {} layers, got {}", Self::DEPTH, stack.len()),
            ));
        }
        if stack.iter().any(|l| l.cell_kind() != CellKind::Lstm) {
            return Err(ModelError::invalid("events", "every scan must be an LSTM"));
        }
        let width = check_bi_chain(&stack, features * window, "events")?;
        if output.input_size() != width {
            return Err(ModelError::invalid(
                "events",
                format!(
                    "output head expects {} inputs, stack yields {width}",
                    output.input_size()
                ),
            ));
        }
        Ok(Self {
            features,
            window,
            stack,
            output,
        })
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stack(&self) -> &[BiLayer] {
        &self.stack
    }

    pub fn output(&self) -> &Dense {
        &self.output
    }

    pub fn num_outputs(&self) -> usize {
        self.output.output_size()
    }

    pub fn tensors(&self) -> Vec<(String, &Matrix)> {
        let mut out = Vec::new();
        for (i, layer) in self.stack.iter().enumerate() {
            layer.collect(i, &mut out);
        }
        out.push(("out.W".to_string(), self.output.w()));
        out.push(("out.b".to_string(), self.output.b()));
        out
    }

    pub(crate) fn from_store(
        features: usize,
        window: usize,
        store: &mut TensorStore,
    ) -> Result<Self, ModelError> {
        let stack = (0..Self::DEPTH)
            .map(|i| BiLayer::take(store, i, CellKind::Lstm))
            .collect::<Result<_, _>>()?;
        let output = Dense::new(store.take("out.W")?, store.take("out.b")?)?;
        Self::new(features, window, stack, output)
    }
}

/// Any weight bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelWeights {
    Posterior(PosteriorWeights),
    Squiggle(SquiggleWeights),
    Events(EventWeights),
}

impl ModelWeights {
    pub fn family(&self) -> crate::AnyFamily {
        match self {
            Self::Posterior(w) => crate::AnyFamily::Posterior(w.family()),
            Self::Squiggle(w) => crate::AnyFamily::Squiggle(w.family()),
            Self::Events(_) => crate::AnyFamily::Events,
        }
    }

    pub fn tensors(&self) -> Vec<(String, &Matrix)> {
        match self {
            Self::Posterior(w) => w.tensors(),
            Self::Squiggle(w) => w.tensors(),
            Self::Events(w) => w.tensors(),
        }
    }

    /// Total number of weight parameters.
    pub fn num_parameters(&self) -> usize {
        self.tensors()
            .iter()
            .map(|(_, m)| m.shape().num_elements())
            .sum()
    }
}
