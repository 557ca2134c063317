use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::network::NeuralNetwork;
use crate::model::trees::GradientBoostedTrees;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub class_id: usize,
    pub probabilities: Vec<f64>,
}

pub trait Classifier {
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Most probable class, with the full distribution.
    fn predict(&self, x: &[f64]) -> Result<PredictionResult, ModelError> {
        let probabilities = self.predict_proba(x)?;
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::NonFiniteOutput);
        }
        let class_id = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
            .ok_or(ModelError::NonFiniteOutput)?;

        Ok(PredictionResult {
            class_id,
            probabilities,
        })
    }
}

/// Everything a classifier artifact file can hold.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ClassifierArtifact {
    TreeEnsemble(GradientBoostedTrees),
    Network(NeuralNetwork),
}

impl ClassifierArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::TreeEnsemble(_) => "gradient-boosted trees",
            ClassifierArtifact::Network(_) => "neural network",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::TreeEnsemble(model) => model.validate(),
            ClassifierArtifact::Network(model) => model.validate(),
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn n_features(&self) -> usize {
        match self {
            ClassifierArtifact::TreeEnsemble(model) => model.n_features,
            ClassifierArtifact::Network(model) => model.input_size(),
        }
    }

    fn n_classes(&self) -> usize {
        match self {
            ClassifierArtifact::TreeEnsemble(model) => model.n_classes,
            ClassifierArtifact::Network(model) => model.output_size(),
        }
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        match self {
            ClassifierArtifact::TreeEnsemble(model) => model.predict_proba(x),
            ClassifierArtifact::Network(model) => {
                if x.len() != model.input_size() {
                    return Err(ModelError::ShapeMismatch {
                        expected: model.input_size(),
                        found: x.len(),
                    });
                }
                let input = Array1::from(x.to_vec()).insert_axis(Axis(0));
                let output = model.forward(&input);
                Ok(output.row(0).to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::DenseLayer;
    use crate::model::trees::RegressionTree;
    use ndarray::{array, Array2};

    fn constant_trees(leaves: [f64; 3]) -> ClassifierArtifact {
        ClassifierArtifact::TreeEnsemble(GradientBoostedTrees {
            n_features: 2,
            n_classes: 3,
            base_score: 0.0,
            trees: leaves.iter().map(|&v| RegressionTree::leaf(v)).collect(),
            tree_class: vec![0, 1, 2],
        })
    }

    #[test]
    fn test_predict_picks_largest_probability() {
        let model = constant_trees([0.1, 2.0, -1.0]);
        let result = model.predict(&[0.0, 0.0]).unwrap();
        assert_eq!(result.class_id, 1);
        assert_eq!(result.probabilities.len(), 3);
    }

    #[test]
    fn test_network_shape_is_checked_before_forward() {
        let model = ClassifierArtifact::Network(
            NeuralNetwork::new(vec![DenseLayer {
                weights: Array2::zeros((9, 5)),
                bias: array![0.0, 0.0, 3.0, 0.0, 0.0],
            }])
            .unwrap(),
        );
        assert_eq!(model.n_features(), 9);
        assert_eq!(model.n_classes(), 5);
        assert_eq!(
            model.predict(&[1.0; 4]),
            Err(ModelError::ShapeMismatch { expected: 9, found: 4 })
        );
        assert_eq!(model.predict(&[1.0; 9]).unwrap().class_id, 2);
    }

    #[test]
    fn test_kind_names_the_model_family() {
        assert_eq!(constant_trees([0.0; 3]).kind(), "gradient-boosted trees");
    }
}
