//! Генерация синтетического датасета для разработки и тестов

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::{LabeledRecord, ObesityLevel, PatientRecord};

pub const DEFAULT_SAMPLES: usize = 2111;
pub const DEFAULT_SEED: u64 = 42;

/// Границы веса (кг) для уровней ожирения, правая граница включительно.
const WEIGHT_BINS: [f64; 8] = [0.0, 50.0, 70.0, 85.0, 100.0, 120.0, 140.0, 250.0];

const GENDERS: [&str; 2] = ["Male", "Female"];
const YES_NO: [&str; 2] = ["yes", "no"];
const CAEC: [&str; 4] = ["Sometimes", "Frequently", "Always", "no"];
const CALC: [&str; 4] = ["no", "Sometimes", "Frequently", "Always"];
const MTRANS: [&str; 5] = [
    "Public_Transportation",
    "Walking",
    "Automobile",
    "Motorbike",
    "Bike",
];

/// Уровень по весу; `None` вне диапазона `(0, 250]`.
pub fn weight_to_level(weight: f64) -> Option<ObesityLevel> {
    WEIGHT_BINS
        .windows(2)
        .position(|edges| weight > edges[0] && weight <= edges[1])
        .map(|i| ObesityLevel::ALL[i])
}

fn pick(rng: &mut StdRng, options: &[&str]) -> Option<String> {
    options.choose(rng).map(|s| s.to_string())
}

/// Синтетические данные: признаки равномерно распределены, семейный анамнез
/// добавляет 10-30 кг, целевая метка определяется весом.
pub fn generate(n_samples: usize, seed: u64) -> Vec<LabeledRecord> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n_samples)
        .map(|_| {
            let family_history = pick(&mut rng, &YES_NO);
            let mut weight = rng.gen_range(39.0..173.0);
            if family_history.as_deref() == Some("yes") {
                weight += rng.gen_range(10.0..30.0);
            }

            let record = PatientRecord {
                gender: pick(&mut rng, &GENDERS),
                age: Some(rng.gen_range(14.0..61.0)),
                height: Some(rng.gen_range(1.45..1.98)),
                weight: Some(weight),
                family_history,
                favc: pick(&mut rng, &YES_NO),
                fcvc: Some(rng.gen_range(1.0..3.0)),
                ncp: Some(rng.gen_range(1.0..4.0)),
                caec: pick(&mut rng, &CAEC),
                smoke: pick(&mut rng, &YES_NO),
                ch2o: Some(rng.gen_range(1.0..3.0)),
                scc: pick(&mut rng, &YES_NO),
                faf: Some(rng.gen_range(0.0..3.0)),
                tue: Some(rng.gen_range(0.0..2.0)),
                calc: pick(&mut rng, &CALC),
                mtrans: pick(&mut rng, &MTRANS),
            };

            // Максимальный вес 173 + 30 укладывается в последний интервал
            let level = weight_to_level(weight).unwrap_or(ObesityLevel::ObesityTypeIII);

            LabeledRecord {
                record,
                target: level.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_are_right_inclusive() {
        assert_eq!(weight_to_level(50.0), Some(ObesityLevel::InsufficientWeight));
        assert_eq!(weight_to_level(50.1), Some(ObesityLevel::NormalWeight));
        assert_eq!(weight_to_level(100.0), Some(ObesityLevel::OverweightLevelII));
        assert_eq!(weight_to_level(200.0), Some(ObesityLevel::ObesityTypeIII));
        assert_eq!(weight_to_level(0.0), None);
        assert_eq!(weight_to_level(251.0), None);
    }

    #[test]
    fn generated_rows_are_consistent() {
        let rows = generate(300, DEFAULT_SEED);
        assert_eq!(rows.len(), 300);

        for row in &rows {
            let weight = row.record.weight.unwrap();
            assert_eq!(row.target, weight_to_level(weight).unwrap().to_string());

            let age = row.record.age.unwrap();
            assert!((14.0..61.0).contains(&age));
            assert!(row.record.mtrans.is_some());
        }
    }

    #[test]
    fn generation_is_reproducible() {
        assert_eq!(generate(20, 7), generate(20, 7));
        assert_ne!(generate(20, 7), generate(20, 8));
    }
}
