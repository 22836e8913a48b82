//! SVM с RBF-ядром через случайные признаки Фурье
//!
//! Ядро `exp(-gamma |x - x'|^2)` аппроксимируется отображением
//! `z(x) = sqrt(2 / D) cos(x W + b)`, `W ~ N(0, 2 gamma)`, `b ~ U(0, 2 pi)`.
//! В пространстве `z` для каждого класса решается задача SVM "один против
//! всех" (hinge loss, `C`) двойственным покоординатным спуском, смещение
//! учитывается как дополнительный признак.

#![allow(non_snake_case)]

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use super::{argmax, balanced_class_weights, Classifier};
use crate::error::{MlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmParams {
    pub c: f64,
    /// `None` означает `1 / (n_features * Var(X))`.
    pub gamma: Option<f64>,
    pub n_components: usize,
    /// Максимум проходов по выборке.
    pub epochs: usize,
    /// Остановка по разбросу проекции градиента двойственной задачи.
    pub tol: f64,
    pub balanced: bool,
    pub seed: u64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            gamma: None,
            n_components: 500,
            epochs: 200,
            tol: 0.1,
            balanced: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSvm {
    gamma: f64,
    /// (n_features, n_components)
    projection: Array2<f64>,
    phase: Array1<f64>,
    /// (n_components, n_classes)
    weights: Array2<f64>,
    bias: Array1<f64>,
}

fn scale_gamma(X: &Array2<f64>) -> f64 {
    let var = X.var(0.0);
    if var > 1e-12 {
        1.0 / (X.ncols() as f64 * var)
    } else {
        1.0
    }
}

/// Один проход двойственного покоординатного спуска.
/// Возвращает разброс проекции градиента, это критерий остановки.
#[allow(clippy::too_many_arguments)]
fn dual_epoch(
    Z: &Array2<f64>,
    target: &[f64],
    upper: &[f64],
    diag: &[f64],
    order: &[usize],
    alpha: &mut [f64],
    w: &mut Array1<f64>,
    b: &mut f64,
) -> f64 {
    let mut pg_max = f64::NEG_INFINITY;
    let mut pg_min = f64::INFINITY;

    for &i in order {
        let z = Z.row(i);
        let g = target[i] * (w.dot(&z) + *b) - 1.0;
        let pg = if alpha[i] <= 0.0 {
            g.min(0.0)
        } else if alpha[i] >= upper[i] {
            g.max(0.0)
        } else {
            g
        };
        pg_max = pg_max.max(pg);
        pg_min = pg_min.min(pg);

        if pg.abs() > 1e-12 {
            let old = alpha[i];
            alpha[i] = (old - g / diag[i]).clamp(0.0, upper[i]);
            let delta = (alpha[i] - old) * target[i];
            w.scaled_add(delta, &z);
            *b += delta;
        }
    }

    pg_max - pg_min
}

impl KernelSvm {
    pub fn fit(
        params: &SvmParams,
        X: &Array2<f64>,
        y: &Array1<usize>,
        n_classes: usize,
    ) -> Result<Self> {
        if params.c <= 0.0 || params.n_components == 0 || params.epochs == 0 || params.tol <= 0.0 {
            return Err(MlError::InvalidParameter(
                "C, n_components, epochs and tol must be positive".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let gamma = params.gamma.unwrap_or_else(|| scale_gamma(X));
        let normal = Normal::new(0.0, (2.0 * gamma).sqrt())
            .map_err(|e| MlError::InvalidParameter(format!("gamma={gamma}: {e}")))?;

        let projection = Array2::from_shape_simple_fn((X.ncols(), params.n_components), || {
            normal.sample(&mut rng)
        });
        let phase = Array1::from_shape_simple_fn(params.n_components, || rng.gen_range(0.0..2.0 * PI));

        let mut model = Self {
            gamma,
            projection,
            phase,
            weights: Array2::zeros((params.n_components, n_classes)),
            bias: Array1::zeros(n_classes),
        };

        let Z = model.features(X);
        let class_weights = if params.balanced {
            balanced_class_weights(y, n_classes)
        } else {
            Array1::ones(n_classes)
        };

        let n_samples = Z.nrows();
        let upper: Vec<f64> = y.iter().map(|&c| params.c * class_weights[c]).collect();
        // Диагональ матрицы Грама с учётом признака смещения
        let diag: Vec<f64> = Z.rows().into_iter().map(|z| z.dot(&z) + 1.0).collect();
        let mut order: Vec<usize> = (0..n_samples).collect();

        for class in 0..n_classes {
            if !y.iter().any(|&c| c == class) {
                // Класса нет в обучении: решающая функция не должна его выбирать
                model.bias[class] = f64::MIN;
                continue;
            }

            let target: Vec<f64> = y.iter().map(|&c| if c == class { 1.0 } else { -1.0 }).collect();
            let mut alpha = vec![0.0; n_samples];
            let mut w = Array1::<f64>::zeros(params.n_components);
            let mut b = 0.0;
            let mut epochs = 0;

            for _ in 0..params.epochs {
                epochs += 1;
                order.shuffle(&mut rng);
                let gap = dual_epoch(&Z, &target, &upper, &diag, &order, &mut alpha, &mut w, &mut b);
                if gap < params.tol {
                    break;
                }
            }
            tracing::debug!("SVM class {}: {} epochs", class, epochs);

            model.weights.column_mut(class).assign(&w);
            model.bias[class] = b;
        }

        tracing::debug!(
            "Kernel SVM trained: gamma={:.4}, {} components",
            model.gamma,
            params.n_components
        );

        Ok(model)
    }

    fn features(&self, X: &Array2<f64>) -> Array2<f64> {
        let scale = (2.0 / self.phase.len() as f64).sqrt();
        let mut Z = X.dot(&self.projection) + &self.phase;
        Z.mapv_inplace(|v| scale * v.cos());
        Z
    }

    /// Значения решающих функций "один против всех".
    pub fn decision_function(&self, X: &Array2<f64>) -> Array2<f64> {
        self.features(X).dot(&self.weights) + &self.bias
    }
}

impl Classifier for KernelSvm {
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>> {
        if X.ncols() != self.projection.nrows() {
            return Err(MlError::FeatureMismatch {
                expected: self.projection.nrows(),
                got: X.ncols(),
            });
        }
        let scores = self.decision_function(X);
        Ok(scores
            .axis_iter(Axis(0))
            .map(|row: ArrayView1<f64>| argmax(row))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{accuracy, blobs};

    #[test]
    fn separates_blobs() {
        let (X, y) = blobs(30, 9);
        let model = KernelSvm::fit(&SvmParams::default(), &X, &y, 3).unwrap();
        assert!(accuracy(&model.predict(&X).unwrap(), &y) > 0.9);
    }

    #[test]
    fn absent_class_is_never_predicted() {
        let (X, y) = blobs(10, 3);
        let model = KernelSvm::fit(&SvmParams::default(), &X, &y, 4).unwrap();
        assert!(model.predict(&X).unwrap().iter().all(|&c| c < 3));
    }

    /// Четыре облака "шахматкой": линейно неразделимо.
    fn xor(per_cluster: usize, seed: u64) -> (Array2<f64>, Array1<usize>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let centers = [(-2.0, -2.0, 0), (2.0, 2.0, 0), (-2.0, 2.0, 1), (2.0, -2.0, 1)];
        let n = per_cluster * centers.len();
        let mut X = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        for (k, (cx, cy, class)) in centers.iter().enumerate() {
            for j in 0..per_cluster {
                let i = k * per_cluster + j;
                X[[i, 0]] = cx + rng.gen_range(-0.7..0.7);
                X[[i, 1]] = cy + rng.gen_range(-0.7..0.7);
                y[i] = *class;
            }
        }
        (X, y)
    }

    #[test]
    fn kernel_separates_xor() {
        let (X, y) = xor(25, 6);
        let model = KernelSvm::fit(&SvmParams::default(), &X, &y, 2).unwrap();
        assert!(accuracy(&model.predict(&X).unwrap(), &y) > 0.95);
    }

    #[test]
    fn dual_descent_reaches_tolerance() {
        let (X, y) = blobs(20, 4);
        let params = SvmParams::default();
        let model = KernelSvm::fit(&params, &X, &y, 3).unwrap();
        let Z = model.features(&X);

        // Повторное решение из нуля для класса 0 с проверкой критерия на каждом проходе
        let target: Vec<f64> = y.iter().map(|&c| if c == 0 { 1.0 } else { -1.0 }).collect();
        let weights = balanced_class_weights(&y, 3);
        let upper: Vec<f64> = y.iter().map(|&c| params.c * weights[c]).collect();
        let diag: Vec<f64> = Z.rows().into_iter().map(|z| z.dot(&z) + 1.0).collect();
        let order: Vec<usize> = (0..Z.nrows()).collect();
        let mut alpha = vec![0.0; Z.nrows()];
        let mut w = Array1::zeros(Z.ncols());
        let mut b = 0.0;

        let gaps: Vec<f64> = (0..params.epochs)
            .map(|_| dual_epoch(&Z, &target, &upper, &diag, &order, &mut alpha, &mut w, &mut b))
            .collect();
        assert!(gaps.iter().any(|&gap| gap < params.tol));
        assert!(alpha.iter().zip(&upper).all(|(&a, &u)| (0.0..=u).contains(&a)));
    }

    #[test]
    fn gamma_scale_uses_overall_variance() {
        let X = ndarray::array![[0.0, 2.0], [2.0, 0.0]];
        // Var = 1, два признака
        assert!((scale_gamma(&X) - 0.5).abs() < 1e-12);
    }
}
