//! Классификаторы и пайплайн

#![allow(non_snake_case)]

pub mod forest;
pub mod logistic;
pub mod pipeline;
pub mod svm;

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};

pub use forest::{ForestParams, RandomForest};
pub use logistic::{LogisticParams, LogisticRegression};
pub use pipeline::{Pipeline, TrainedPipeline};
pub use svm::{KernelSvm, SvmParams};

/// Обученный классификатор: матрица признаков -> коды классов.
pub trait Classifier {
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>>;
}

/// Веса классов `n_samples / (n_classes * count_c)`; для отсутствующих классов 0.
pub fn balanced_class_weights(y: &Array1<usize>, n_classes: usize) -> Array1<f64> {
    let mut counts = vec![0usize; n_classes];
    for &class in y {
        if class < n_classes {
            counts[class] += 1;
        }
    }

    let present = counts.iter().filter(|&&c| c > 0).count().max(1);
    let n = y.len() as f64;
    counts
        .iter()
        .map(|&c| {
            if c == 0 {
                0.0
            } else {
                n / (present as f64 * c as f64)
            }
        })
        .collect()
}

/// Индекс максимума; при равенстве побеждает меньший индекс.
pub(crate) fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (j, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = j;
        }
    }
    best
}

pub(crate) fn check_training_data(X: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
    if X.nrows() == 0 || X.ncols() == 0 {
        return Err(MlError::EmptyDataset);
    }
    if X.nrows() != y.len() {
        return Err(MlError::InvalidInput(format!(
            "{} rows of features but {} targets",
            X.nrows(),
            y.len()
        )));
    }
    if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
        return Err(MlError::UnknownCode(bad));
    }
    Ok(())
}

/// Кандидат турнира моделей с гиперпараметрами.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression(LogisticParams),
    RandomForest(ForestParams),
    Svm(SvmParams),
}

impl ModelSpec {
    /// Три кандидата в порядке турнира.
    pub fn candidates(seed: u64) -> Vec<ModelSpec> {
        vec![
            ModelSpec::LogisticRegression(LogisticParams::default()),
            ModelSpec::RandomForest(ForestParams {
                seed,
                ..ForestParams::default()
            }),
            ModelSpec::Svm(SvmParams {
                seed,
                ..SvmParams::default()
            }),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelSpec::LogisticRegression(_) => "Logistic Regression",
            ModelSpec::RandomForest(_) => "Random Forest",
            ModelSpec::Svm(_) => "SVM",
        }
    }

    pub fn fit(&self, X: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<TrainedModel> {
        check_training_data(X, y, n_classes)?;

        Ok(match self {
            ModelSpec::LogisticRegression(params) => {
                TrainedModel::LogisticRegression(LogisticRegression::fit(params, X, y, n_classes)?)
            }
            ModelSpec::RandomForest(params) => {
                TrainedModel::RandomForest(RandomForest::fit(params, X, y, n_classes)?)
            }
            ModelSpec::Svm(params) => TrainedModel::Svm(KernelSvm::fit(params, X, y, n_classes)?),
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    Svm(KernelSvm),
}

impl TrainedModel {
    pub fn name(&self) -> &'static str {
        match self {
            TrainedModel::LogisticRegression(_) => "Logistic Regression",
            TrainedModel::RandomForest(_) => "Random Forest",
            TrainedModel::Svm(_) => "SVM",
        }
    }
}

impl Classifier for TrainedModel {
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>> {
        match self {
            TrainedModel::LogisticRegression(model) => model.predict(X),
            TrainedModel::RandomForest(model) => model.predict(X),
            TrainedModel::Svm(model) => model.predict(X),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use ndarray::{Array1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Три хорошо разделённых облака точек в 2D.
    pub fn blobs(per_class: usize, seed: u64) -> (Array2<f64>, Array1<usize>) {
        let centers = [(-3.0, -3.0), (3.0, -3.0), (0.0, 3.0)];
        let mut rng = StdRng::seed_from_u64(seed);
        let n = per_class * centers.len();
        let mut X = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);

        for (class, (cx, cy)) in centers.iter().enumerate() {
            for k in 0..per_class {
                let i = class * per_class + k;
                X[[i, 0]] = cx + rng.gen_range(-0.5..0.5);
                X[[i, 1]] = cy + rng.gen_range(-0.5..0.5);
                y[i] = class;
            }
        }
        (X, y)
    }

    pub fn accuracy(pred: &Array1<usize>, y: &Array1<usize>) -> f64 {
        pred.iter().zip(y).filter(|(a, b)| a == b).count() as f64 / y.len() as f64
    }
}
