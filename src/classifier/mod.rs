//! Posture classifier runtime.
//!
//! The collector and the predictor only talk to the [`Classifier`] trait: it
//! accepts row-major input batches and returns one raw (unsquashed) score per
//! row. [`dense::DenseClassifier`] is the native implementation, a two-layer
//! dense network trained with Adam on mean squared error.

/// Adam optimizer used by the dense network
pub mod adam;

/// Dense network classifier head
pub mod dense;

use crate::Result;
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Training schedule passed to [`Classifier::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    /// Shuffle rows at the start of every epoch
    pub shuffle: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: crate::constants::DEFAULT_EPOCHS,
            batch_size: crate::constants::DEFAULT_BATCH_SIZE,
            shuffle: true,
        }
    }
}

/// Summary of a completed training call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub epochs: usize,
    pub samples: usize,
    /// Mean loss over the last epoch
    pub final_loss: f32,
}

/// Hidden layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
}

impl Activation {
    pub(crate) fn apply(self, value: f32) -> f32 {
        match self {
            Activation::Linear => value,
            Activation::Relu => value.max(0.0),
        }
    }

    pub(crate) fn derivative(self, value: f32) -> f32 {
        match self {
            Activation::Linear => 1.0,
            Activation::Relu => {
                if value > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Binary classifier over flattened keypoint vectors
pub trait Classifier {
    /// Number of features per input row
    fn input_dim(&self) -> usize;

    /// Raw score per row of `inputs`
    ///
    /// # Errors
    ///
    /// Returns an error if the column count differs from [`Classifier::input_dim`]
    fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array1<f32>>;

    /// Train in place on `inputs` and `labels`, consuming both
    ///
    /// # Errors
    ///
    /// Returns an error on shape mismatches, empty datasets or a diverging run
    fn fit(&mut self, inputs: Array2<f32>, labels: Array1<f32>, options: &FitOptions) -> Result<FitReport>;
}

/// Logistic squashing function
#[must_use]
pub fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
        assert!((sigmoid(1.0) - 0.731_058_6).abs() < 1e-6);
    }

    #[test]
    fn test_activation() {
        assert_eq!(Activation::Linear.apply(-2.0), -2.0);
        assert_eq!(Activation::Relu.apply(-2.0), 0.0);
        assert_eq!(Activation::Relu.derivative(3.0), 1.0);
        assert_eq!(Activation::Relu.derivative(-3.0), 0.0);
        assert_eq!(Activation::Linear.derivative(-3.0), 1.0);
    }
}
