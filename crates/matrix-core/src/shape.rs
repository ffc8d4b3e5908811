// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Logical matrix shape and padded-layout arithmetic.

use crate::LANE_WIDTH;
use std::fmt;

/// Logical dimensions of a [`crate::Matrix`].
///
/// `rows` is the feature (state) axis and `cols` is the time axis. The
/// physical layout pads `rows` up to the next multiple of [`LANE_WIDTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    /// Creates a shape of `rows × cols`.
    ///
    /// # Examples
    /// ```
    /// use matrix_core::Shape;
    /// let s = Shape::new(5, 3);
    /// assert_eq!(s.padded_rows(), 8);
    /// assert_eq!(s.padded_len(), 24);
    /// ```
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Creates a single-column shape.
    pub const fn vector(rows: usize) -> Self {
        Self { rows, cols: 1 }
    }

    /// Number of lane groups per column (`ceil(rows / LANE_WIDTH)`).
    pub const fn lane_groups(&self) -> usize {
        self.rows.div_ceil(LANE_WIDTH)
    }

    /// Physical rows per column, padding included.
    pub const fn padded_rows(&self) -> usize {
        self.lane_groups() * LANE_WIDTH
    }

    /// Number of logical elements.
    pub const fn num_elements(&self) -> usize {
        self.rows * self.cols
    }

    /// Length of the backing buffer, padding included.
    pub const fn padded_len(&self) -> usize {
        self.padded_rows() * self.cols
    }

    /// Returns `true` if the shape holds no logical elements.
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} x {}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_rounds_up() {
        assert_eq!(Shape::new(0, 3).padded_rows(), 0);
        assert_eq!(Shape::new(1, 3).padded_rows(), 4);
        assert_eq!(Shape::new(4, 3).padded_rows(), 4);
        assert_eq!(Shape::new(5, 3).padded_rows(), 8);
        assert_eq!(Shape::new(5, 3).lane_groups(), 2);
    }

    #[test]
    fn test_lengths() {
        let s = Shape::new(6, 10);
        assert_eq!(s.num_elements(), 60);
        assert_eq!(s.padded_len(), 80);
        assert!(!s.is_empty());
        assert!(Shape::new(6, 0).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Shape::new(2, 7)), "[2 x 7]");
    }

    #[test]
    fn test_serde_roundtrip() {
        let s = Shape::new(3, 9);
        let json = serde_json::to_string(&s).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
