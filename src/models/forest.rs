//! Случайный лес поверх деревьев решений linfa

#![allow(non_snake_case)]

use std::fmt;

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{argmax, balanced_class_weights, Classifier};
use crate::error::{MlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub balanced: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            balanced: true,
            seed: 42,
        }
    }
}

/// Бэггинг деревьев (Gini) с голосованием большинством.
#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree<f64, usize>>,
    n_classes: usize,
    n_features: usize,
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest")
            .field("n_trees", &self.trees.len())
            .field("n_classes", &self.n_classes)
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl RandomForest {
    pub fn fit(
        params: &ForestParams,
        X: &Array2<f64>,
        y: &Array1<usize>,
        n_classes: usize,
    ) -> Result<Self> {
        if params.n_estimators == 0 {
            return Err(MlError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }

        let n_samples = X.nrows();
        let class_weights = if params.balanced {
            balanced_class_weights(y, n_classes)
        } else {
            Array1::ones(n_classes)
        };

        let mut trees = Vec::with_capacity(params.n_estimators);
        for t in 0..params.n_estimators {
            // Отдельный сид на дерево: результат не зависит от порядка обучения
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let records = X.select(Axis(0), &sample);
            let targets = y.select(Axis(0), &sample);
            let weights: Array1<f32> = sample.iter().map(|&i| class_weights[y[i]] as f32).collect();

            let dataset = Dataset::new(records, targets).with_weights(weights);
            let tree = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(params.max_depth)
                .fit(&dataset)
                .map_err(|e| MlError::Model(e.to_string()))?;
            trees.push(tree);
        }

        tracing::debug!("Random forest trained: {} trees", trees.len());

        Ok(Self {
            trees,
            n_classes,
            n_features: X.ncols(),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>> {
        if X.ncols() != self.n_features {
            return Err(MlError::FeatureMismatch {
                expected: self.n_features,
                got: X.ncols(),
            });
        }

        let mut votes = Array2::<f64>::zeros((X.nrows(), self.n_classes));
        for tree in &self.trees {
            let predictions: Array1<usize> = tree.predict(X);
            for (i, &class) in predictions.iter().enumerate() {
                if class < self.n_classes {
                    votes[[i, class]] += 1.0;
                }
            }
        }

        Ok(votes.rows().into_iter().map(argmax).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{accuracy, blobs};

    #[test]
    fn forest_is_reproducible_for_a_seed() {
        let (X, y) = blobs(15, 2);
        let params = ForestParams {
            n_estimators: 10,
            ..ForestParams::default()
        };

        let a = RandomForest::fit(&params, &X, &y, 3).unwrap();
        let b = RandomForest::fit(&params, &X, &y, 3).unwrap();
        assert_eq!(a.n_trees(), 10);
        assert_eq!(a.predict(&X).unwrap(), b.predict(&X).unwrap());
        assert!(accuracy(&a.predict(&X).unwrap(), &y) > 0.95);
    }

    #[test]
    fn zero_trees_is_rejected() {
        let (X, y) = blobs(5, 2);
        let params = ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        };
        assert!(RandomForest::fit(&params, &X, &y, 3).is_err());
    }

    #[test]
    fn survives_json_round_trip() {
        let (X, y) = blobs(10, 4);
        let params = ForestParams {
            n_estimators: 5,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&params, &X, &y, 3).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(forest.predict(&X).unwrap(), restored.predict(&X).unwrap());
    }
}
