//! Стандартизация признаков

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};

/// Приведение колонок к нулевому среднему и единичной дисперсии.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(MlError::EmptyDataset);
        }

        self.mean = Some(X.mean_axis(Axis(0)).ok_or(MlError::EmptyDataset)?);

        // Постоянная колонка: делим на 1, чтобы избежать деления на ноль
        let mut std = X.std_axis(Axis(0), 0.0);
        std.mapv_inplace(|s| if s < 1e-10 { 1.0 } else { s });
        self.std = Some(std);

        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(MlError::InvalidParameter("scaler is not fitted".to_string())),
        };

        if X.ncols() != mean.len() {
            return Err(MlError::FeatureMismatch {
                expected: mean.len(),
                got: X.ncols(),
            });
        }

        Ok((X - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }
}
