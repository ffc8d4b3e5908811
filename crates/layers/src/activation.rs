// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Substitutable elementwise activations.

use matrix_core::{elu_inplace, tanh_inplace, Matrix};

/// An activation applied after a convolution.
///
/// Every variant maps zero to zero, so applying it over the padded buffer
/// keeps the padding rows at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Tanh,
    Elu,
}

impl Activation {
    /// Applies the activation in place.
    pub fn apply(self, x: &mut Matrix) {
        match self {
            Self::Tanh => tanh_inplace(x),
            Self::Elu => elu_inplace(x),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tanh => "tanh",
            Self::Elu => "elu",
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activations_fix_zero() {
        for act in [Activation::Tanh, Activation::Elu] {
            let mut m = Matrix::zeros(5, 3);
            act.apply(&mut m);
            assert!(m.as_padded_slice().iter().all(|&v| v == 0.0), "{act}");
        }
    }

    #[test]
    fn test_elu_differs_from_tanh() {
        let mut a = Matrix::from_column_major(1, 2, &[-0.5, 2.0]).unwrap();
        let mut b = a.clone();
        Activation::Tanh.apply(&mut a);
        Activation::Elu.apply(&mut b);
        assert_eq!(b[(0, 1)], 2.0);
        assert!(a[(0, 1)] < 1.0);
    }
}
