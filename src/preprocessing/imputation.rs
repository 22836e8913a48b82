//! Заполнение пропусков

#![allow(non_snake_case)]

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};

/// Категориальные колонки построчно; `None` означает пропуск.
pub type CategoryRows = Vec<Vec<Option<String>>>;

/// Замена NaN медианой колонки.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianImputer {
    statistics: Vec<f64>,
}

impl MedianImputer {
    pub fn fit(X: &Array2<f64>, names: &[&str]) -> Result<Self> {
        if X.nrows() == 0 {
            return Err(MlError::EmptyDataset);
        }

        let statistics = X
            .columns()
            .into_iter()
            .enumerate()
            .map(|(j, column)| {
                let mut observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
                if observed.is_empty() {
                    return Err(MlError::EmptyColumn(column_name(names, j)));
                }
                observed.sort_by(f64::total_cmp);
                let mid = observed.len() / 2;
                Ok(if observed.len() % 2 == 0 {
                    (observed[mid - 1] + observed[mid]) / 2.0
                } else {
                    observed[mid]
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self { statistics })
    }

    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        if X.ncols() != self.statistics.len() {
            return Err(MlError::FeatureMismatch {
                expected: self.statistics.len(),
                got: X.ncols(),
            });
        }

        let mut filled = X.clone();
        for mut row in filled.rows_mut() {
            for (val, fill) in row.iter_mut().zip(&self.statistics) {
                if val.is_nan() {
                    *val = *fill;
                }
            }
        }
        Ok(filled)
    }
}

/// Замена пропуска самым частым значением колонки.
/// При равенстве частот берётся лексикографически меньшее значение.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    statistics: Vec<String>,
}

impl MostFrequentImputer {
    pub fn fit(rows: &CategoryRows, names: &[&str]) -> Result<Self> {
        if rows.is_empty() {
            return Err(MlError::EmptyDataset);
        }

        let statistics = (0..names.len())
            .map(|j| {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for row in rows {
                    if let Some(value) = row.get(j).and_then(|v| v.as_deref()) {
                        *counts.entry(value).or_insert(0) += 1;
                    }
                }

                // BTreeMap обходится по возрастанию: первый максимум и есть нужный
                let mut best: Option<(&str, usize)> = None;
                for (value, count) in counts {
                    if best.map_or(true, |(_, c)| count > c) {
                        best = Some((value, count));
                    }
                }
                best.map(|(value, _)| value.to_string())
                    .ok_or_else(|| MlError::EmptyColumn(column_name(names, j)))
            })
            .collect::<Result<Vec<String>>>()?;

        Ok(Self { statistics })
    }

    pub fn statistics(&self) -> &[String] {
        &self.statistics
    }

    pub fn transform(&self, rows: &CategoryRows) -> Result<Vec<Vec<String>>> {
        rows.iter()
            .map(|row| {
                if row.len() != self.statistics.len() {
                    return Err(MlError::FeatureMismatch {
                        expected: self.statistics.len(),
                        got: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .zip(&self.statistics)
                    .map(|(value, fill)| value.clone().unwrap_or_else(|| fill.clone()))
                    .collect())
            })
            .collect()
    }
}

fn column_name(names: &[&str], j: usize) -> String {
    names
        .get(j)
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("#{j}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn median_fills_nan() {
        let X = array![[1.0, f64::NAN], [f64::NAN, 4.0], [3.0, 8.0], [10.0, 6.0]];
        let imputer = MedianImputer::fit(&X, &["a", "b"]).unwrap();
        assert_eq!(imputer.statistics(), &[3.0, 6.0]);

        let filled = imputer.transform(&X).unwrap();
        assert_eq!(filled[[1, 0]], 3.0);
        assert_eq!(filled[[0, 1]], 6.0);
        assert_eq!(filled[[3, 0]], 10.0);
    }

    #[test]
    fn median_rejects_fully_missing_column() {
        let X = array![[1.0, f64::NAN], [2.0, f64::NAN]];
        let err = MedianImputer::fit(&X, &["Age", "Height"]).unwrap_err();
        assert!(matches!(err, MlError::EmptyColumn(name) if name == "Height"));
    }

    #[test]
    fn most_frequent_breaks_ties_lexicographically() {
        let rows = vec![
            vec![s("yes"), s("b")],
            vec![s("no"), s("a")],
            vec![s("yes"), None],
            vec![None, s("b")],
            vec![s("no"), s("a")],
        ];
        let imputer = MostFrequentImputer::fit(&rows, &["x", "y"]).unwrap();
        // x: yes=2, no=2 -> "no"; y: a=2, b=2 -> "a"
        assert_eq!(imputer.statistics(), &["no".to_string(), "a".to_string()]);

        let filled = imputer.transform(&rows).unwrap();
        assert_eq!(filled[2][1], "a");
        assert_eq!(filled[3][0], "no");
        assert_eq!(filled[0][0], "yes");
    }
}
