// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Recurrent scans (GRU and peephole LSTM).
//!
//! The input to a scan is the already-projected gate matrix, i.e. the
//! output of a [`crate::Dense`] layer applied to the layer input. A scan
//! only adds the recurrent contribution of the previous state. The state
//! starts at zero and the output column `t` holds the hidden state after
//! consuming input column `t`, whatever the scan direction.
//!
//! Gate row layout within an input column of a cell of size `n`:
//!
//! ```text
//! GRU   [0, n)  update   [n, 2n)  reset    [2n, 3n) candidate
//! LSTM  [0, n)  input    [n, 2n)  update   [2n, 3n) forget   [3n, 4n) output
//! ```

use crate::LayerError;
use matrix_core::{gemv_transposed, Matrix, Shape};
use tracing::trace;

/// Order in which a scan visits the columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Increasing column index.
    Forward,
    /// Decreasing column index.
    Backward,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    fn steps(self, n: usize) -> Box<dyn Iterator<Item = usize>> {
        match self {
            Self::Forward => Box::new(0..n),
            Self::Backward => Box::new((0..n).rev()),
        }
    }
}

#[inline]
fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Gated recurrent unit, forward in time.
pub fn gru_forward(
    x: &Matrix,
    sw: &Matrix,
    sw2: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    gru_scan(x, sw, sw2, Direction::Forward, out)
}

/// Gated recurrent unit, backward in time.
pub fn gru_backward(
    x: &Matrix,
    sw: &Matrix,
    sw2: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    gru_scan(x, sw, sw2, Direction::Backward, out)
}

/// Peephole LSTM, forward in time.
pub fn lstm_forward(
    x: &Matrix,
    sw: &Matrix,
    peephole: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    lstm_scan(x, sw, peephole, Direction::Forward, out)
}

/// Peephole LSTM, backward in time.
pub fn lstm_backward(
    x: &Matrix,
    sw: &Matrix,
    peephole: &Matrix,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    lstm_scan(x, sw, peephole, Direction::Backward, out)
}

fn check_gru(sw: &Matrix, sw2: &Matrix) -> Result<usize, LayerError> {
    let size = sw.rows();
    if sw.shape() != Shape::new(size, 2 * size) {
        return Err(LayerError::invalid(
            "gru",
            format!("state weight {} is not [n x 2n]", sw.shape()),
        ));
    }
    if sw2.shape() != Shape::new(size, size) {
        return Err(LayerError::invalid(
            "gru",
            format!("candidate weight {} is not [{size} x {size}]", sw2.shape()),
        ));
    }
    Ok(size)
}

fn check_lstm(sw: &Matrix, peephole: &Matrix) -> Result<usize, LayerError> {
    let size = sw.rows();
    if sw.shape() != Shape::new(size, 4 * size) {
        return Err(LayerError::invalid(
            "lstm",
            format!("state weight {} is not [n x 4n]", sw.shape()),
        ));
    }
    if peephole.shape() != Shape::vector(3 * size) {
        return Err(LayerError::invalid(
            "lstm",
            format!("peephole {} is not [{} x 1]", peephole.shape(), 3 * size),
        ));
    }
    Ok(size)
}

fn check_gates(op: &'static str, x: &Matrix, gate_rows: usize) -> Result<(), LayerError> {
    if x.rows() != gate_rows {
        return Err(matrix_core::MatrixError::ShapeMismatch {
            op,
            lhs: Shape::new(gate_rows, x.cols()),
            rhs: x.shape(),
        }
        .into());
    }
    Ok(())
}

fn gru_scan(
    x: &Matrix,
    sw: &Matrix,
    sw2: &Matrix,
    direction: Direction,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let size = check_gru(sw, sw2)?;
    check_gates("gru", x, 3 * size)?;
    let mut h_out = Matrix::reuse_or_alloc(out, Shape::new(size, x.cols()), "gru (output)")?;
    trace!(size, steps = x.cols(), ?direction, "gru scan");

    let padded = sw.padded_rows();
    let mut state = vec![0.0f32; padded];
    let mut reset_state = vec![0.0f32; padded];
    let mut gates = vec![0.0f32; 2 * size];
    let mut candidate = vec![0.0f32; size];

    for t in direction.steps(x.cols()) {
        let xt = x.column(t);
        gates.copy_from_slice(&xt[..2 * size]);
        gemv_transposed(sw, &state, &mut gates)?;
        gates.iter_mut().for_each(|g| *g = logistic(*g));
        let (update, reset) = gates.split_at(size);

        for i in 0..size {
            reset_state[i] = reset[i] * state[i];
        }
        candidate.copy_from_slice(&xt[2 * size..]);
        gemv_transposed(sw2, &reset_state, &mut candidate)?;

        for i in 0..size {
            let hbar = candidate[i].tanh();
            state[i] = update[i] * state[i] + (1.0 - update[i]) * hbar;
        }
        h_out.column_mut(t).copy_from_slice(&state[..size]);
    }
    Ok(h_out)
}

fn lstm_scan(
    x: &Matrix,
    sw: &Matrix,
    peephole: &Matrix,
    direction: Direction,
    out: Option<Matrix>,
) -> Result<Matrix, LayerError> {
    let size = check_lstm(sw, peephole)?;
    check_gates("lstm", x, 4 * size)?;
    let mut h_out = Matrix::reuse_or_alloc(out, Shape::new(size, x.cols()), "lstm (output)")?;
    trace!(size, steps = x.cols(), ?direction, "lstm scan");

    let p = peephole.column(0);
    let mut state = vec![0.0f32; sw.padded_rows()];
    let mut cell = vec![0.0f32; size];
    let mut gates = vec![0.0f32; 4 * size];

    for t in direction.steps(x.cols()) {
        gates.copy_from_slice(x.column(t));
        gemv_transposed(sw, &state, &mut gates)?;

        for i in 0..size {
            let forget = logistic(gates[2 * size + i] + cell[i] * p[size + i]);
            let update = logistic(gates[size + i] + cell[i] * p[i]);
            cell[i] = forget * cell[i] + update * gates[i].tanh();
            let output = logistic(gates[3 * size + i] + cell[i] * p[2 * size + i]);
            state[i] = output * cell[i].tanh();
        }
        h_out.column_mut(t).copy_from_slice(&state[..size]);
    }
    Ok(h_out)
}

/// A recurrent cell's state weights, independent of the input projection.
pub trait RecurrentCell {
    /// Width of the hidden state.
    fn size(&self) -> usize;

    /// Rows of the gate matrix the cell consumes per time step.
    fn gate_rows(&self) -> usize;

    /// Runs the cell over every column of `x` in `direction`.
    fn scan(
        &self,
        x: &Matrix,
        direction: Direction,
        out: Option<Matrix>,
    ) -> Result<Matrix, LayerError>;
}

/// GRU state weights: `sW` is `[n, 2n]`, `sW2` is `[n, n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GruCell {
    sw: Matrix,
    sw2: Matrix,
}

impl GruCell {
    pub fn new(sw: Matrix, sw2: Matrix) -> Result<Self, LayerError> {
        check_gru(&sw, &sw2)?;
        Ok(Self { sw, sw2 })
    }

    pub fn sw(&self) -> &Matrix {
        &self.sw
    }

    pub fn sw2(&self) -> &Matrix {
        &self.sw2
    }
}

impl RecurrentCell for GruCell {
    fn size(&self) -> usize {
        self.sw.rows()
    }

    fn gate_rows(&self) -> usize {
        3 * self.size()
    }

    fn scan(
        &self,
        x: &Matrix,
        direction: Direction,
        out: Option<Matrix>,
    ) -> Result<Matrix, LayerError> {
        gru_scan(x, &self.sw, &self.sw2, direction, out)
    }
}

/// LSTM state weights: `sW` is `[n, 4n]`, the peephole vector is `[3n, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmCell {
    sw: Matrix,
    peephole: Matrix,
}

impl LstmCell {
    pub fn new(sw: Matrix, peephole: Matrix) -> Result<Self, LayerError> {
        check_lstm(&sw, &peephole)?;
        Ok(Self { sw, peephole })
    }

    pub fn sw(&self) -> &Matrix {
        &self.sw
    }

    pub fn peephole(&self) -> &Matrix {
        &self.peephole
    }
}

impl RecurrentCell for LstmCell {
    fn size(&self) -> usize {
        self.sw.rows()
    }

    fn gate_rows(&self) -> usize {
        4 * self.size()
    }

    fn scan(
        &self,
        x: &Matrix,
        direction: Direction,
        out: Option<Matrix>,
    ) -> Result<Matrix, LayerError> {
        lstm_scan(x, &self.sw, &self.peephole, direction, out)
    }
}

/// Either cell type, for graphs that are generic over the recurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Gru(GruCell),
    Lstm(LstmCell),
}

impl RecurrentCell for Cell {
    fn size(&self) -> usize {
        match self {
            Self::Gru(c) => c.size(),
            Self::Lstm(c) => c.size(),
        }
    }

    fn gate_rows(&self) -> usize {
        match self {
            Self::Gru(c) => c.gate_rows(),
            Self::Lstm(c) => c.gate_rows(),
        }
    }

    fn scan(
        &self,
        x: &Matrix,
        direction: Direction,
        out: Option<Matrix>,
    ) -> Result<Matrix, LayerError> {
        match self {
            Self::Gru(c) => c.scan(x, direction, out),
            Self::Lstm(c) => c.scan(x, direction, out),
        }
    }
}

impl From<GruCell> for Cell {
    fn from(c: GruCell) -> Self {
        Self::Gru(c)
    }
}

impl From<LstmCell> for Cell {
    fn from(c: LstmCell) -> Self {
        Self::Lstm(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reverse_columns(m: &Matrix) -> Matrix {
        let n = m.cols();
        Matrix::from_fn(m.rows(), n, |r, c| m[(r, n - 1 - c)])
    }

    fn gru_weights(size: usize) -> (Matrix, Matrix) {
        let sw = Matrix::from_fn(size, 2 * size, |r, c| ((r * 5 + c * 3) % 7) as f32 * 0.1 - 0.3);
        let sw2 = Matrix::from_fn(size, size, |r, c| ((r + 2 * c) % 5) as f32 * 0.1 - 0.2);
        (sw, sw2)
    }

    fn lstm_weights(size: usize) -> (Matrix, Matrix) {
        let sw = Matrix::from_fn(size, 4 * size, |r, c| ((r * 3 + c) % 7) as f32 * 0.1 - 0.3);
        let p = Matrix::from_fn(3 * size, 1, |r, _| (r % 3) as f32 * 0.1 - 0.1);
        (sw, p)
    }

    #[test]
    fn test_gru_single_step_by_hand() {
        // With zero initial state the recurrent terms vanish:
        // h = (1 - σ(z)) * tanh(hbar).
        let x = Matrix::from_column_major(3, 1, &[0.3, -1.0, 0.7]).unwrap();
        let sw = Matrix::from_fn(1, 2, |_, _| 0.9);
        let sw2 = Matrix::from_fn(1, 1, |_, _| 0.9);
        let h = gru_forward(&x, &sw, &sw2, None).unwrap();
        let z = logistic(0.3);
        assert_abs_diff_eq!(h[(0, 0)], (1.0 - z) * 0.7f32.tanh(), epsilon = 1e-6);
    }

    #[test]
    fn test_gru_second_step_uses_state() {
        let x = Matrix::from_column_major(3, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        let sw = Matrix::from_column_major(1, 2, &[0.5, 0.2]).unwrap();
        let sw2 = Matrix::from_column_major(1, 1, &[0.4]).unwrap();
        let h = gru_forward(&x, &sw, &sw2, None).unwrap();
        let h0 = 0.5 * 1.0f32.tanh();
        let z = logistic(0.5 * h0);
        let r = logistic(0.2 * h0);
        let hbar = (0.4 * r * h0).tanh();
        assert_abs_diff_eq!(h[(0, 0)], h0, epsilon = 1e-6);
        assert_abs_diff_eq!(h[(0, 1)], z * h0 + (1.0 - z) * hbar, epsilon = 1e-6);
    }

    #[test]
    fn test_backward_is_reversed_forward() {
        let size = 5;
        let x = Matrix::from_fn(3 * size, 9, |r, c| ((r * 7 + c * 11) % 13) as f32 * 0.1 - 0.6);
        let (sw, sw2) = gru_weights(size);
        let bwd = gru_backward(&x, &sw, &sw2, None).unwrap();
        let fwd = gru_forward(&reverse_columns(&x), &sw, &sw2, None).unwrap();
        assert_eq!(bwd, reverse_columns(&fwd));

        let x = Matrix::from_fn(4 * size, 9, |r, c| ((r * 7 + c * 11) % 13) as f32 * 0.1 - 0.6);
        let (sw, p) = lstm_weights(size);
        let bwd = lstm_backward(&x, &sw, &p, None).unwrap();
        let fwd = lstm_forward(&reverse_columns(&x), &sw, &p, None).unwrap();
        assert_eq!(bwd, reverse_columns(&fwd));
    }

    #[test]
    fn test_lstm_single_step_by_hand() {
        // One unit, zero state: c = σ(u) * tanh(i), h = σ(o + c * p_o) * tanh(c).
        let x = Matrix::from_column_major(4, 1, &[0.5, 0.2, -0.3, 0.1]).unwrap();
        let sw = Matrix::zeros(1, 4);
        let p = Matrix::from_column_major(3, 1, &[0.7, 0.7, 0.3]).unwrap();
        let h = lstm_forward(&x, &sw, &p, None).unwrap();
        let c = logistic(0.2) * 0.5f32.tanh();
        let expect = logistic(0.1 + c * 0.3) * c.tanh();
        assert_abs_diff_eq!(h[(0, 0)], expect, epsilon = 1e-6);
    }

    #[test]
    fn test_outputs_bounded_and_padded() {
        let size = 6;
        let x = Matrix::from_fn(4 * size, 12, |r, c| (r as f32 - c as f32) * 0.4);
        let (sw, p) = lstm_weights(size);
        let h = lstm_forward(&x, &sw, &p, None).unwrap();
        assert_eq!(h.shape(), Shape::new(size, 12));
        assert!(h.to_column_major().iter().all(|v| v.abs() < 1.0));
        assert!(h.padding_is_zero());
    }

    #[test]
    fn test_gate_rows_checked() {
        let (sw, sw2) = gru_weights(4);
        let x = Matrix::zeros(11, 3);
        assert!(matches!(
            gru_forward(&x, &sw, &sw2, None),
            Err(LayerError::Matrix(_))
        ));
        assert!(GruCell::new(Matrix::zeros(4, 7), sw2).is_err());
        assert!(LstmCell::new(Matrix::zeros(2, 8), Matrix::zeros(5, 1)).is_err());
    }

    #[test]
    fn test_cell_dispatch() {
        let (sw, sw2) = gru_weights(3);
        let cell: Cell = GruCell::new(sw.clone(), sw2.clone()).unwrap().into();
        assert_eq!(cell.size(), 3);
        assert_eq!(cell.gate_rows(), 9);
        let x = Matrix::from_fn(9, 4, |r, c| (r + c) as f32 * 0.05);
        assert_eq!(
            cell.scan(&x, Direction::Backward, None).unwrap(),
            gru_backward(&x, &sw, &sw2, None).unwrap()
        );
    }

    #[test]
    fn test_empty_sequence() {
        let (sw, sw2) = gru_weights(2);
        let h = gru_forward(&Matrix::zeros(6, 0), &sw, &sw2, None).unwrap();
        assert_eq!(h.shape(), Shape::new(2, 0));
    }
}
