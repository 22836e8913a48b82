//! Стратифицированное разбиение: train/test и k-fold

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{MlError, Result};

fn group_by_class(targets: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &class) in targets.iter().enumerate() {
        groups.entry(class).or_default().push(i);
    }
    groups
}

/// Стратифицированное разбиение индексов на обучающую и тестовую части.
///
/// Каждый класс отдаёт в тест `round(count * test_size)` строк, так что
/// пропорции классов сохраняются в обеих частях.
pub fn train_test_split(
    targets: &[usize],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MlError::InvalidParameter(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    if targets.is_empty() {
        return Err(MlError::EmptyDataset);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut indices) in group_by_class(targets) {
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_size).round() as usize).min(indices.len());
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(MlError::InvalidParameter(format!(
            "test_size {test_size} leaves one side of the split empty"
        )));
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Стратифицированная кросс-валидация.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, shuffle: bool, seed: u64) -> Self {
        Self {
            n_splits,
            shuffle,
            seed,
        }
    }

    /// Пары `(train, validation)` индексов, по одной на фолд.
    pub fn split(&self, targets: &[usize]) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(MlError::InvalidParameter(format!(
                "n_splits must be at least 2, got {}",
                self.n_splits
            )));
        }
        if self.n_splits > targets.len() {
            return Err(MlError::InvalidParameter(format!(
                "n_splits={} exceeds the number of samples {}",
                self.n_splits,
                targets.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        let mut slot = 0;

        for (class, mut indices) in group_by_class(targets) {
            if indices.len() < self.n_splits {
                tracing::warn!(
                    "Class {} has only {} members, fewer than n_splits={}",
                    class,
                    indices.len(),
                    self.n_splits
                );
            }
            if self.shuffle {
                indices.shuffle(&mut rng);
            }
            // Сквозной round-robin: размеры фолдов отличаются не более чем на 1
            for idx in indices {
                folds[slot].push(idx);
                slot = (slot + 1) % self.n_splits;
            }
        }

        let splits = (0..self.n_splits)
            .map(|k| {
                let mut validation = folds[k].clone();
                validation.sort_unstable();
                let mut train: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != k)
                    .flat_map(|(_, fold)| fold.iter().copied())
                    .collect();
                train.sort_unstable();
                (train, validation)
            })
            .collect();

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<usize> {
        // 3 класса: 50, 30, 20 объектов
        let mut t = vec![0; 50];
        t.extend(vec![1; 30]);
        t.extend(vec![2; 20]);
        t
    }

    fn count(indices: &[usize], targets: &[usize], class: usize) -> usize {
        indices.iter().filter(|&&i| targets[i] == class).count()
    }

    #[test]
    fn split_preserves_class_proportions() {
        let y = targets();
        let (train, test) = train_test_split(&y, 0.2, 42).unwrap();

        assert_eq!(train.len() + test.len(), y.len());
        assert_eq!(count(&test, &y, 0), 10);
        assert_eq!(count(&test, &y, 1), 6);
        assert_eq!(count(&test, &y, 2), 4);
        assert!(train.iter().all(|i| !test.contains(i)));
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let y = targets();
        assert_eq!(
            train_test_split(&y, 0.2, 7).unwrap(),
            train_test_split(&y, 0.2, 7).unwrap()
        );
    }

    #[test]
    fn split_rejects_bad_test_size() {
        assert!(train_test_split(&targets(), 0.0, 1).is_err());
        assert!(train_test_split(&targets(), 1.0, 1).is_err());
    }

    #[test]
    fn kfold_partitions_every_sample_once() {
        let y = targets();
        let folds = StratifiedKFold::new(5, true, 42).split(&y).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0usize; y.len()];
        for (train, validation) in &folds {
            assert_eq!(train.len() + validation.len(), y.len());
            assert_eq!(validation.len(), 20);
            assert_eq!(count(validation, &y, 0), 10);
            assert_eq!(count(validation, &y, 2), 4);
            for &i in validation {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn kfold_validates_split_count() {
        let y = targets();
        assert!(StratifiedKFold::new(1, false, 0).split(&y).is_err());
        assert!(StratifiedKFold::new(101, false, 0).split(&y).is_err());
    }
}
