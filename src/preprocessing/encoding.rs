//! Кодирование категориальных признаков и целевых меток

use std::collections::BTreeSet;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};

/// One-hot кодирование. Словарь каждой колонки отсортирован, первая
/// категория отбрасывается; неизвестные значения кодируются нулями.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    drop_first: bool,
}

impl OneHotEncoder {
    pub fn fit(rows: &[Vec<String>], n_columns: usize, drop_first: bool) -> Result<Self> {
        if rows.is_empty() {
            return Err(MlError::EmptyDataset);
        }

        let categories = (0..n_columns)
            .map(|j| {
                rows.iter()
                    .filter_map(|row| row.get(j).cloned())
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();

        Ok(Self {
            categories,
            drop_first,
        })
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    fn kept(&self, column: usize) -> &[String] {
        let cats = &self.categories[column];
        if self.drop_first && !cats.is_empty() {
            &cats[1..]
        } else {
            cats
        }
    }

    pub fn n_features_out(&self) -> usize {
        (0..self.categories.len()).map(|j| self.kept(j).len()).sum()
    }

    pub fn feature_names(&self, names: &[&str]) -> Vec<String> {
        (0..self.categories.len())
            .flat_map(|j| {
                let prefix = names.get(j).copied().unwrap_or("x");
                self.kept(j)
                    .iter()
                    .map(move |cat| format!("{prefix}_{cat}"))
            })
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<String>]) -> Result<Array2<f64>> {
        let mut encoded = Array2::zeros((rows.len(), self.n_features_out()));

        for (i, row) in rows.iter().enumerate() {
            if row.len() != self.categories.len() {
                return Err(MlError::FeatureMismatch {
                    expected: self.categories.len(),
                    got: row.len(),
                });
            }

            let mut offset = 0;
            for (j, value) in row.iter().enumerate() {
                let kept = self.kept(j);
                if let Some(pos) = kept.iter().position(|cat| cat == value) {
                    encoded[[i, offset + pos]] = 1.0;
                }
                offset += kept.len();
            }
        }

        Ok(encoded)
    }
}

/// Порядковое кодирование с заданным порядком категорий.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    names: Vec<String>,
    categories: Vec<Vec<String>>,
}

impl OrdinalEncoder {
    pub fn new(names: &[&str], categories: Vec<Vec<String>>) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            categories,
        }
    }

    pub fn transform(&self, rows: &[Vec<String>]) -> Result<Array2<f64>> {
        let mut encoded = Array2::zeros((rows.len(), self.categories.len()));

        for (i, row) in rows.iter().enumerate() {
            if row.len() != self.categories.len() {
                return Err(MlError::FeatureMismatch {
                    expected: self.categories.len(),
                    got: row.len(),
                });
            }
            for (j, value) in row.iter().enumerate() {
                let code = self.categories[j]
                    .iter()
                    .position(|cat| cat == value)
                    .ok_or_else(|| MlError::UnknownCategory {
                        feature: self.names.get(j).cloned().unwrap_or_default(),
                        value: value.clone(),
                    })?;
                encoded[[i, j]] = code as f64;
            }
        }

        Ok(encoded)
    }
}

/// Отображение имён классов в коды `0..n` (по алфавиту) и обратно.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        if labels.is_empty() {
            return Err(MlError::EmptyDataset);
        }
        let classes = labels
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<usize>> {
        labels
            .iter()
            .map(|l| {
                self.classes
                    .binary_search_by(|c| c.as_str().cmp(l.as_ref()))
                    .map_err(|_| MlError::UnknownLabel(l.as_ref().to_string()))
            })
            .collect::<Result<Vec<usize>>>()
            .map(Array1::from)
    }

    pub fn inverse_transform(&self, codes: &Array1<usize>) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| {
                self.classes
                    .get(code)
                    .cloned()
                    .ok_or(MlError::UnknownCode(code))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn one_hot_drops_first_and_ignores_unknown() {
        let train = rows(&[&["Male", "Bike"], &["Female", "Walking"], &["Male", "Automobile"]]);
        let encoder = OneHotEncoder::fit(&train, 2, true).unwrap();

        // Gender: [Female, Male] -> Male; MTRANS: [Automobile, Bike, Walking] -> Bike, Walking
        assert_eq!(encoder.n_features_out(), 3);
        assert_eq!(
            encoder.feature_names(&["Gender", "MTRANS"]),
            vec!["Gender_Male", "MTRANS_Bike", "MTRANS_Walking"]
        );

        let encoded = encoder
            .transform(&rows(&[&["Male", "Walking"], &["Female", "Automobile"], &["Other", "Rocket"]]))
            .unwrap();
        assert_eq!(
            encoded,
            array![[1.0, 0.0, 1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn ordinal_uses_given_order() {
        let order: Vec<String> = ["no", "Sometimes", "Frequently", "Always"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let encoder = OrdinalEncoder::new(&["CAEC"], vec![order]);

        let encoded = encoder.transform(&rows(&[&["Always"], &["no"], &["Sometimes"]])).unwrap();
        assert_eq!(encoded, array![[3.0], [0.0], [1.0]]);

        let err = encoder.transform(&rows(&[&["Never"]])).unwrap_err();
        assert!(matches!(err, MlError::UnknownCategory { feature, .. } if feature == "CAEC"));
    }

    #[test]
    fn label_encoder_sorts_classes() {
        let labels = ["Normal_Weight", "Obesity_Type_I", "Insufficient_Weight", "Normal_Weight"];
        let encoder = LabelEncoder::fit(&labels).unwrap();

        assert_eq!(
            encoder.classes(),
            &["Insufficient_Weight", "Normal_Weight", "Obesity_Type_I"]
        );
        assert_eq!(encoder.transform(&labels).unwrap(), array![1, 2, 0, 1]);
        assert_eq!(
            encoder.inverse_transform(&array![2, 0]).unwrap(),
            vec!["Obesity_Type_I", "Insufficient_Weight"]
        );
        assert!(encoder.transform(&["Obese"]).is_err());
        assert!(encoder.inverse_transform(&array![9]).is_err());
    }
}
