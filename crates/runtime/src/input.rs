// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Caller-owned inputs and their conversion to feature matrices.

use crate::RuntimeError;
use nn_layers::Matrix;

/// A raw signal and the `[start, end)` window of it to process.
///
/// A window with `start >= end` is empty. `end` is clamped to the number of
/// samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    samples: Vec<f32>,
    start: usize,
    end: usize,
}

impl RawTable {
    /// A table whose window covers every sample.
    pub fn new(samples: Vec<f32>) -> Self {
        let end = samples.len();
        Self {
            samples,
            start: 0,
            end,
        }
    }

    /// A table restricted to `samples[start..end]`.
    pub fn with_window(samples: Vec<f32>, start: usize, end: usize) -> Self {
        let end = end.min(samples.len());
        Self {
            samples,
            start,
            end,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// All samples, ignoring the window.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The windowed samples.
    pub fn signal(&self) -> &[f32] {
        if self.is_empty() {
            &[]
        } else {
            &self.samples[self.start..self.end]
        }
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<Vec<f32>> for RawTable {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

/// The windowed signal as a `1 × len` matrix, or `None` if the window is
/// empty.
pub fn features_from_raw(raw: &RawTable) -> Option<Matrix> {
    let signal = raw.signal();
    if signal.is_empty() {
        return None;
    }
    Some(Matrix::from_fn(1, signal.len(), |_, c| signal[c]))
}

/// Precomputed per-event feature vectors, stored event after event.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    features: usize,
    values: Vec<f32>,
}

impl FeatureTable {
    /// Wraps `values`, which hold `features` values per event.
    ///
    /// # Errors
    /// Returns [`RuntimeError::InvalidInput`] if `features` is zero or does
    /// not divide `values.len()`.
    pub fn new(features: usize, values: Vec<f32>) -> Result<Self, RuntimeError> {
        if features == 0 || values.len() % features != 0 {
            return Err(RuntimeError::InvalidInput(format!(
                "{} values do not form events of {features} features",
                values.len()
            )));
        }
        Ok(Self { features, values })
    }

    /// Builds a table from one slice per event.
    pub fn from_events<E: AsRef<[f32]>>(events: &[E]) -> Result<Self, RuntimeError> {
        let features = events.first().map_or(0, |e| e.as_ref().len());
        if events.iter().any(|e| e.as_ref().len() != features) {
            return Err(RuntimeError::InvalidInput(
                "events have differing feature counts".into(),
            ));
        }
        let values = events
            .iter()
            .flat_map(|e| e.as_ref().iter().copied())
            .collect();
        Ok(Self { features, values })
    }

    /// Features per event.
    pub fn features(&self) -> usize {
        self.features
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        if self.features == 0 {
            0
        } else {
            self.values.len() / self.features
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature vector of event `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn event(&self, i: usize) -> &[f32] {
        &self.values[i * self.features..(i + 1) * self.features]
    }

    /// The table as a `features × len` matrix, one column per event.
    pub fn to_matrix(&self) -> Matrix {
        let nf = self.features;
        Matrix::from_fn(nf, self.len(), |r, c| self.values[c * nf + r])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_window() {
        let raw = RawTable::with_window(vec![1.0, 2.0, 3.0, 4.0, 5.0], 1, 4);
        assert_eq!(raw.len(), 3);
        let m = features_from_raw(&raw).unwrap();
        assert_eq!(m.rows(), 1);
        assert_eq!(m.to_column_major(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_windows() {
        assert!(features_from_raw(&RawTable::new(Vec::new())).is_none());
        let inverted = RawTable::with_window(vec![1.0, 2.0, 3.0], 2, 1);
        assert!(inverted.is_empty());
        assert_eq!(inverted.len(), 0);
        assert!(features_from_raw(&inverted).is_none());
    }

    #[test]
    fn test_window_end_clamped() {
        let raw = RawTable::with_window(vec![1.0, 2.0], 0, 10);
        assert_eq!(raw.end(), 2);
        assert_eq!(raw.signal(), &[1.0, 2.0]);
    }

    #[test]
    fn test_feature_table_layout() {
        let t = FeatureTable::from_events(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.event(1), &[3.0, 4.0]);
        let m = t.to_matrix();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.column(2), &[5.0, 6.0]);
    }

    #[test]
    fn test_feature_table_validation() {
        assert!(FeatureTable::new(3, vec![0.0; 7]).is_err());
        assert!(FeatureTable::new(0, vec![]).is_err());
        assert!(FeatureTable::from_events(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }
}
