use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::layers::{relu, softmax};

/// One fully connected layer: `x · weights + bias`.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

/// Feed-forward classifier: ReLU on every hidden layer, softmax on the last.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl fmt::Debug for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NeuralNetwork {{")?;
        for (i, layer) in self.layers.iter().enumerate() {
            write!(f, "\n  layer{}: {:?} + bias {}", i + 1, layer.weights.dim(), layer.bias.len())?;
        }
        write!(f, "\n}}")
    }
}

impl NeuralNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, String> {
        let network = NeuralNetwork { layers };
        network.validate()?;
        Ok(network)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.weights.nrows()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.weights.ncols()).unwrap_or(0)
    }

    /// Checks that consecutive layers chain and that every bias matches its
    /// layer width.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".to_string());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.bias.len() != layer.weights.ncols() {
                return Err(format!(
                    "layer {} has {} outputs but a bias of length {}",
                    i + 1,
                    layer.weights.ncols(),
                    layer.bias.len()
                ));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].weights.ncols() != pair[1].weights.nrows() {
                return Err(format!(
                    "layer {} outputs {} values but layer {} takes {}",
                    i + 1,
                    pair[0].weights.ncols(),
                    i + 2,
                    pair[1].weights.nrows()
                ));
            }
        }
        Ok(())
    }

    /// Class probabilities for each row of `x`.
    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let last = self.layers.len().saturating_sub(1);
        let mut activation = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            let z = activation.dot(&layer.weights) + &layer.bias.view().insert_axis(Axis(0));
            activation = if i == last { softmax(&z) } else { relu(&z) };
        }
        activation
    }
}
