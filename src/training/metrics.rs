//! Метрики классификации

use std::collections::BTreeSet;
use std::fmt;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Table};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub fn accuracy(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(a, b)| a == b).count();
    correct as f64 / y_true.len() as f64
}

/// Строки - истинные классы, столбцы - предсказанные.
pub fn confusion_matrix(y_true: &Array1<usize>, y_pred: &Array1<usize>, n_classes: usize) -> Array2<usize> {
    let mut matrix = Array2::zeros((n_classes, n_classes));
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if t < n_classes && p < n_classes {
            matrix[[t, p]] += 1;
        }
    }
    matrix
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn per_class(confusion: &Array2<usize>) -> Vec<ClassMetrics> {
    (0..confusion.nrows())
        .map(|c| {
            let tp = confusion[[c, c]];
            let predicted = confusion.column(c).sum();
            let support = confusion.row(c).sum();
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect()
}

/// Взвешенный по поддержке F1; классы без поддержки вклада не дают.
pub fn f1_weighted(y_true: &Array1<usize>, y_pred: &Array1<usize>, n_classes: usize) -> f64 {
    let metrics = per_class(&confusion_matrix(y_true, y_pred, n_classes));
    let total: usize = metrics.iter().map(|m| m.support).sum();
    if total == 0 {
        return 0.0;
    }
    metrics.iter().map(|m| m.f1 * m.support as f64).sum::<f64>() / total as f64
}

/// Отчёт по классам с макро- и взвешенным усреднением.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub class_names: Vec<String>,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: Vec<Vec<usize>>,
}

impl ClassificationReport {
    pub fn new(y_true: &Array1<usize>, y_pred: &Array1<usize>, class_names: &[String]) -> Self {
        let n_classes = class_names.len();
        let confusion = confusion_matrix(y_true, y_pred, n_classes);
        let per_class = per_class(&confusion);
        let total: usize = per_class.iter().map(|m| m.support).sum();

        // Макро-среднее по классам, встречающимся в истине или предсказаниях
        let seen: BTreeSet<usize> = y_true
            .iter()
            .chain(y_pred.iter())
            .copied()
            .filter(|&c| c < n_classes)
            .collect();
        let n_seen = seen.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            precision: seen.iter().map(|&c| per_class[c].precision).sum::<f64>() / n_seen,
            recall: seen.iter().map(|&c| per_class[c].recall).sum::<f64>() / n_seen,
            f1: seen.iter().map(|&c| per_class[c].f1).sum::<f64>() / n_seen,
            support: total,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: total,
        };

        Self {
            class_names: class_names.to_vec(),
            accuracy: accuracy(y_true, y_pred),
            macro_avg,
            weighted_avg,
            confusion: confusion.rows().into_iter().map(|r| r.to_vec()).collect(),
            per_class,
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("").add_attribute(Attribute::Bold),
            Cell::new("precision").add_attribute(Attribute::Bold),
            Cell::new("recall").add_attribute(Attribute::Bold),
            Cell::new("f1-score").add_attribute(Attribute::Bold),
            Cell::new("support").add_attribute(Attribute::Bold),
        ]);

        let row = |name: &str, m: &ClassMetrics| {
            vec![
                Cell::new(name),
                Cell::new(format!("{:.2}", m.precision)),
                Cell::new(format!("{:.2}", m.recall)),
                Cell::new(format!("{:.2}", m.f1)),
                Cell::new(m.support),
            ]
        };

        for (name, metrics) in self.class_names.iter().zip(&self.per_class) {
            table.add_row(row(name, metrics));
        }
        table.add_row(vec![
            Cell::new("accuracy").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(""),
            Cell::new(format!("{:.2}", self.accuracy)),
            Cell::new(self.macro_avg.support),
        ]);
        table.add_row(row("macro avg", &self.macro_avg));
        table.add_row(row("weighted avg", &self.weighted_avg));
        table
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn perfect_predictions() {
        let y = array![0, 1, 2, 1];
        assert_eq!(accuracy(&y, &y), 1.0);
        assert_eq!(f1_weighted(&y, &y, 3), 1.0);
    }

    #[test]
    fn weighted_f1_matches_hand_computation() {
        let y_true = array![0, 0, 0, 1, 1, 2];
        let y_pred = array![0, 0, 1, 1, 2, 2];
        // class 0: p=1, r=2/3, f1=0.8; class 1: p=0.5, r=0.5, f1=0.5; class 2: p=0.5, r=1, f1=2/3
        let expected = (0.8 * 3.0 + 0.5 * 2.0 + (2.0 / 3.0) * 1.0) / 6.0;
        assert!((f1_weighted(&y_true, &y_pred, 3) - expected).abs() < 1e-12);
        assert!((accuracy(&y_true, &y_pred) - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn zero_division_yields_zero() {
        let y_true = array![0, 0];
        let y_pred = array![1, 1];
        let report = ClassificationReport::new(&y_true, &y_pred, &["a".to_string(), "b".to_string()]);
        assert_eq!(report.per_class[1].precision, 0.0);
        assert_eq!(report.per_class[1].support, 0);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.confusion, vec![vec![0, 2], vec![0, 0]]);
    }

    #[test]
    fn averages_skip_unseen_classes() {
        // class 2 never predicted (zero division), class 3 absent everywhere
        let y_true = array![0, 0, 1, 1, 2];
        let y_pred = array![0, 1, 1, 1, 0];
        let names: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let report = ClassificationReport::new(&y_true, &y_pred, &names);

        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        // per class: a (0.5, 0.5, 0.5, 2), b (2/3, 1, 0.8, 2), c (0, 0, 0, 1)
        assert_eq!(report.per_class[2], ClassMetrics { support: 1, ..Default::default() });
        assert!(close(report.macro_avg.precision, (0.5 + 2.0 / 3.0) / 3.0));
        assert!(close(report.macro_avg.recall, 0.5));
        assert!(close(report.macro_avg.f1, 1.3 / 3.0));
        assert_eq!(report.macro_avg.support, 5);

        assert!(close(report.weighted_avg.precision, 7.0 / 15.0));
        assert!(close(report.weighted_avg.recall, 0.6));
        assert!(close(report.weighted_avg.f1, 0.52));
        assert!(close(report.accuracy, 0.6));
        assert!(close(f1_weighted(&y_true, &y_pred, 4), report.weighted_avg.f1));
    }

    #[test]
    fn report_renders_every_class() {
        let y = array![0, 1];
        let names = vec!["Normal_Weight".to_string(), "Obesity_Type_I".to_string()];
        let rendered = ClassificationReport::new(&y, &y, &names).to_string();
        assert!(rendered.contains("Normal_Weight"));
        assert!(rendered.contains("weighted avg"));
    }
}
