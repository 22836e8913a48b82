//! Мультиномиальная логистическая регрессия (L-BFGS)

#![allow(non_snake_case)]

use std::collections::VecDeque;

use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::{argmax, balanced_class_weights, Classifier};
use crate::error::{MlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Обратная сила L2-регуляризации.
    pub c: f64,
    pub max_iter: usize,
    /// Число пар (s, y), которые хранит L-BFGS.
    pub memory: usize,
    /// Остановка, когда максимальная компонента градиента меньше порога.
    pub tol: f64,
    pub balanced: bool,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            memory: 10,
            tol: 1e-4,
            balanced: true,
        }
    }
}

/// Взвешенная кросс-энтропия / n + |W|^2 / (2 C n); смещение не штрафуется.
///
/// Параметры упакованы в вектор: сначала `W` (n_features x n_classes) по
/// строкам, затем смещения.
struct Objective<'a> {
    X: &'a Array2<f64>,
    one_hot: Array2<f64>,
    sample_weights: Array1<f64>,
    n: f64,
    alpha: f64,
}

impl<'a> Objective<'a> {
    fn new(params: &LogisticParams, X: &'a Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Self {
        let class_weights = if params.balanced {
            balanced_class_weights(y, n_classes)
        } else {
            Array1::ones(n_classes)
        };

        let mut one_hot = Array2::<f64>::zeros((X.nrows(), n_classes));
        for (i, &c) in y.iter().enumerate() {
            one_hot[[i, c]] = 1.0;
        }

        let n = X.nrows() as f64;
        Self {
            X,
            one_hot,
            sample_weights: y.iter().map(|&c| class_weights[c]).collect(),
            n,
            alpha: 1.0 / (params.c * n),
        }
    }

    fn n_classes(&self) -> usize {
        self.one_hot.ncols()
    }

    fn n_params(&self) -> usize {
        (self.X.ncols() + 1) * self.n_classes()
    }

    fn unpack(&self, theta: &Array1<f64>) -> (Array2<f64>, Array1<f64>) {
        let p = self.X.ncols();
        let k = self.n_classes();
        let W = Array2::from_shape_fn((p, k), |(i, j)| theta[i * k + j]);
        (W, theta.slice(s![p * k..]).to_owned())
    }

    /// Значение функции потерь и её градиент.
    fn eval(&self, theta: &Array1<f64>) -> (f64, Array1<f64>) {
        let (W, b) = self.unpack(theta);
        let mut logits = self.X.dot(&W) + &b;

        let mut loss = 0.0;
        for ((mut row, target), w) in logits
            .rows_mut()
            .into_iter()
            .zip(self.one_hot.rows())
            .zip(self.sample_weights.iter())
        {
            let max = row.fold(f64::NEG_INFINITY, |a, &v| a.max(v));
            let lse = max + row.iter().map(|&v| (v - max).exp()).sum::<f64>().ln();
            loss += w * (lse - row.dot(&target));
            // строка превращается в w_i (P_i - Y_i) / n
            row.mapv_inplace(|v| (v - lse).exp());
            row -= &target;
            row *= *w / self.n;
        }
        loss = loss / self.n + 0.5 * self.alpha * W.iter().map(|v| v * v).sum::<f64>();

        let grad_W = self.X.t().dot(&logits) + &W * self.alpha;
        let grad_b = logits.sum_axis(Axis(0));

        let mut grad = Array1::zeros(self.n_params());
        grad.slice_mut(s![..grad_W.len()])
            .assign(&Array1::from_iter(grad_W.iter().copied()));
        grad.slice_mut(s![grad_W.len()..]).assign(&grad_b);
        (loss, grad)
    }
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()))
}

/// Направление L-BFGS (двухцикловая рекурсия).
fn lbfgs_direction(grad: &Array1<f64>, history: &VecDeque<(Array1<f64>, Array1<f64>, f64)>) -> Array1<f64> {
    let mut q = grad.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for (s, y, rho) in history.iter().rev() {
        let a = rho * s.dot(&q);
        q.scaled_add(-a, y);
        alphas.push(a);
    }

    let gamma = history
        .back()
        .map(|(s, y, _)| s.dot(y) / y.dot(y))
        .unwrap_or_else(|| 1.0 / max_abs(grad).max(1.0));
    let mut r = q * gamma;

    for ((s, y, rho), a) in history.iter().zip(alphas.into_iter().rev()) {
        let b = rho * y.dot(&r);
        r.scaled_add(a - b, s);
    }
    -r
}

/// Softmax-регрессия.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// (n_features, n_classes)
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticRegression {
    pub fn fit(
        params: &LogisticParams,
        X: &Array2<f64>,
        y: &Array1<usize>,
        n_classes: usize,
    ) -> Result<Self> {
        if params.c <= 0.0 || params.max_iter == 0 || params.memory == 0 {
            return Err(MlError::InvalidParameter(
                "C, max_iter and memory must be positive".to_string(),
            ));
        }

        let objective = Objective::new(params, X, y, n_classes);
        let mut theta = Array1::<f64>::zeros(objective.n_params());
        let (mut loss, mut grad) = objective.eval(&theta);
        let mut history = VecDeque::with_capacity(params.memory);

        let mut iterations = 0;
        while iterations < params.max_iter && max_abs(&grad) >= params.tol {
            iterations += 1;

            let mut direction = lbfgs_direction(&grad, &history);
            let mut slope = grad.dot(&direction);
            if slope >= 0.0 {
                history.clear();
                direction = -&grad;
                slope = -grad.dot(&grad);
            }

            // Бэктрекинг по условию Армихо
            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..50 {
                let candidate = &theta + &(&direction * step);
                let (candidate_loss, candidate_grad) = objective.eval(&candidate);
                if candidate_loss <= loss + 1e-4 * step * slope {
                    accepted = Some((candidate, candidate_loss, candidate_grad));
                    break;
                }
                step *= 0.5;
            }
            let Some((next, next_loss, next_grad)) = accepted else {
                tracing::warn!("Logistic regression line search failed at iteration {}", iterations);
                break;
            };

            let s = &next - &theta;
            let yv = &next_grad - &grad;
            let sy = s.dot(&yv);
            if sy > 1e-10 {
                if history.len() == params.memory {
                    history.pop_front();
                }
                history.push_back((s, yv, 1.0 / sy));
            }

            theta = next;
            loss = next_loss;
            grad = next_grad;
        }

        let converged = max_abs(&grad) < params.tol;
        if converged {
            tracing::debug!("Logistic regression converged after {} iterations", iterations);
        } else {
            tracing::warn!(
                "Logistic regression stopped after {} iterations, max |grad| = {:.2e}",
                iterations,
                max_abs(&grad)
            );
        }

        let (W, b) = objective.unpack(&theta);
        Ok(Self {
            weights: W,
            bias: b,
        })
    }

    /// Вероятности классов, по строке на объект.
    pub fn predict_proba(&self, X: &Array2<f64>) -> Array2<f64> {
        let mut logits = X.dot(&self.weights) + &self.bias;
        for mut row in logits.rows_mut() {
            let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row /= sum;
        }
        logits
    }

    #[cfg(test)]
    fn packed(&self) -> Array1<f64> {
        self.weights.iter().chain(self.bias.iter()).copied().collect()
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>> {
        if X.ncols() != self.weights.nrows() {
            return Err(MlError::FeatureMismatch {
                expected: self.weights.nrows(),
                got: X.ncols(),
            });
        }
        let proba = self.predict_proba(X);
        Ok(proba.rows().into_iter().map(argmax).collect())
    }
}
