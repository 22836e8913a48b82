//! Препроцессор по группам колонок (column transformer)
//!
//! Группы и порядок выходных колонок:
//! - числовые (`Age`, `Height`, опционально `Weight`): медиана + стандартизация;
//! - номинальные: самое частое значение + one-hot без первой категории;
//! - порядковые (`CAEC`, `CALC`): самое частое значение + порядковый код;
//! - шкалы (`FCVC`, `NCP`, `CH2O`, `FAF`, `TUE`): медиана + округление + стандартизация.
//!
//! Остальные колонки отбрасываются.

#![allow(non_snake_case)]

use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::encoding::{OneHotEncoder, OrdinalEncoder};
use super::imputation::{CategoryRows, MedianImputer, MostFrequentImputer};
use super::normalization::StandardScaler;
use crate::error::{MlError, Result};
use crate::types::{Feature, PatientRecord};

pub const NOMINAL_FEATURES: [Feature; 6] = [
    Feature::Gender,
    Feature::FamilyHistory,
    Feature::Favc,
    Feature::Smoke,
    Feature::Scc,
    Feature::Mtrans,
];

pub const ORDINAL_FEATURES: [Feature; 2] = [Feature::Caec, Feature::Calc];

/// Общий порядок для CAEC и CALC.
pub const FREQUENCY_ORDER: [&str; 4] = ["no", "Sometimes", "Frequently", "Always"];

pub const SCALE_FEATURES: [Feature; 5] = [
    Feature::Fcvc,
    Feature::Ncp,
    Feature::Ch2o,
    Feature::Faf,
    Feature::Tue,
];

/// Настройки препроцессора.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Учитывать вес. По умолчанию выключено: превентивная модель не должна
    /// видеть признак, напрямую определяющий метку.
    pub include_weight: bool,
}

impl PreprocessorConfig {
    pub fn numeric_features(&self) -> Vec<Feature> {
        let mut features = vec![Feature::Age, Feature::Height];
        if self.include_weight {
            features.push(Feature::Weight);
        }
        features
    }
}

/// Ненастроенный препроцессор. `fit` возвращает [`FittedPreprocessor`].
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessorConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, records: &[PatientRecord]) -> Result<FittedPreprocessor> {
        if records.is_empty() {
            return Err(MlError::EmptyDataset);
        }

        let numeric_features = self.config.numeric_features();

        let num_raw = numeric_matrix(records, &numeric_features);
        let num_imputer = MedianImputer::fit(&num_raw, &names(&numeric_features))?;
        let mut num_scaler = StandardScaler::new();
        num_scaler.fit(&num_imputer.transform(&num_raw)?)?;

        let nom_raw = category_rows(records, &NOMINAL_FEATURES);
        let nom_imputer = MostFrequentImputer::fit(&nom_raw, &names(&NOMINAL_FEATURES))?;
        let one_hot = OneHotEncoder::fit(
            &nom_imputer.transform(&nom_raw)?,
            NOMINAL_FEATURES.len(),
            true,
        )?;

        let ord_raw = category_rows(records, &ORDINAL_FEATURES);
        let ord_imputer = MostFrequentImputer::fit(&ord_raw, &names(&ORDINAL_FEATURES))?;
        let order: Vec<String> = FREQUENCY_ORDER.iter().map(|s| s.to_string()).collect();
        let ordinal = OrdinalEncoder::new(
            &names(&ORDINAL_FEATURES),
            vec![order.clone(), order],
        );

        let scale_raw = numeric_matrix(records, &SCALE_FEATURES);
        let scale_imputer = MedianImputer::fit(&scale_raw, &names(&SCALE_FEATURES))?;
        let mut scale_scaler = StandardScaler::new();
        scale_scaler.fit(&round_half_even(scale_imputer.transform(&scale_raw)?))?;

        let fitted = FittedPreprocessor {
            config: self.config,
            numeric_features,
            num_imputer,
            num_scaler,
            nom_imputer,
            one_hot,
            ord_imputer,
            ordinal,
            scale_imputer,
            scale_scaler,
        };

        tracing::debug!(
            "Preprocessor fitted on {} rows, {} output features",
            records.len(),
            fitted.n_features_out()
        );

        Ok(fitted)
    }

    pub fn fit_transform(&self, records: &[PatientRecord]) -> Result<(Array2<f64>, FittedPreprocessor)> {
        let fitted = self.fit(records)?;
        let X = fitted.transform(records)?;
        Ok((X, fitted))
    }
}

/// Обученный препроцессор: хранит статистики всех групп.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    config: PreprocessorConfig,
    numeric_features: Vec<Feature>,
    num_imputer: MedianImputer,
    num_scaler: StandardScaler,
    nom_imputer: MostFrequentImputer,
    one_hot: OneHotEncoder,
    ord_imputer: MostFrequentImputer,
    ordinal: OrdinalEncoder,
    scale_imputer: MedianImputer,
    scale_scaler: StandardScaler,
}

impl FittedPreprocessor {
    pub fn config(&self) -> PreprocessorConfig {
        self.config
    }

    pub fn n_features_out(&self) -> usize {
        self.numeric_features.len()
            + self.one_hot.n_features_out()
            + ORDINAL_FEATURES.len()
            + SCALE_FEATURES.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .numeric_features
            .iter()
            .map(|f| f.column_name().to_string())
            .collect();
        out.extend(self.one_hot.feature_names(&names(&NOMINAL_FEATURES)));
        out.extend(ORDINAL_FEATURES.iter().map(|f| f.column_name().to_string()));
        out.extend(SCALE_FEATURES.iter().map(|f| f.column_name().to_string()));
        out
    }

    pub fn transform(&self, records: &[PatientRecord]) -> Result<Array2<f64>> {
        if records.is_empty() {
            return Err(MlError::EmptyDataset);
        }

        let num = self.num_scaler.transform(
            &self
                .num_imputer
                .transform(&numeric_matrix(records, &self.numeric_features))?,
        )?;

        let nom = self.one_hot.transform(
            &self
                .nom_imputer
                .transform(&category_rows(records, &NOMINAL_FEATURES))?,
        )?;

        let ord = self.ordinal.transform(
            &self
                .ord_imputer
                .transform(&category_rows(records, &ORDINAL_FEATURES))?,
        )?;

        let scale = self.scale_scaler.transform(&round_half_even(
            self.scale_imputer
                .transform(&numeric_matrix(records, &SCALE_FEATURES))?,
        ))?;

        concatenate(Axis(1), &[num.view(), nom.view(), ord.view(), scale.view()])
            .map_err(|e| MlError::InvalidInput(e.to_string()))
    }
}

fn names(features: &[Feature]) -> Vec<&'static str> {
    features.iter().map(|f| f.column_name()).collect()
}

/// Пропуски числовых колонок представлены NaN.
fn numeric_matrix(records: &[PatientRecord], features: &[Feature]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), features.len()), |(i, j)| {
        records[i].numeric(features[j]).unwrap_or(f64::NAN)
    })
}

fn category_rows(records: &[PatientRecord], features: &[Feature]) -> CategoryRows {
    records
        .iter()
        .map(|r| {
            features
                .iter()
                .map(|&f| r.category(f).map(str::to_string))
                .collect()
        })
        .collect()
}

/// Банковское округление: шкалы должны быть дискретными, шум синтетики убирается.
fn round_half_even(mut X: Array2<f64>) -> Array2<f64> {
    X.mapv_inplace(f64::round_ties_even);
    X
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(gender: &str, age: f64, weight: f64, caec: &str, fcvc: f64) -> PatientRecord {
        PatientRecord {
            gender: Some(gender.to_string()),
            age: Some(age),
            height: Some(1.70),
            weight: Some(weight),
            family_history: Some("yes".to_string()),
            favc: Some("no".to_string()),
            fcvc: Some(fcvc),
            ncp: Some(3.0),
            caec: Some(caec.to_string()),
            smoke: Some("no".to_string()),
            ch2o: Some(2.0),
            scc: Some("no".to_string()),
            faf: Some(1.0),
            tue: Some(1.0),
            calc: Some("no".to_string()),
            mtrans: Some("Walking".to_string()),
        }
    }

    fn sample() -> Vec<PatientRecord> {
        vec![
            patient("Male", 20.0, 60.0, "Sometimes", 1.4),
            patient("Female", 30.0, 80.0, "Always", 2.5),
            patient("Male", 40.0, 100.0, "no", 2.6),
        ]
    }

    #[test]
    fn weight_is_excluded_by_default() {
        let fitted = Preprocessor::default().fit(&sample()).unwrap();
        let names = fitted.feature_names();

        assert!(!names.contains(&"Weight".to_string()));
        assert_eq!(names[0], "Age");
        assert_eq!(names.len(), fitted.n_features_out());
    }

    #[test]
    fn diagnostic_layout_includes_weight() {
        let config = PreprocessorConfig { include_weight: true };
        let (X, fitted) = Preprocessor::new(config).fit_transform(&sample()).unwrap();

        // 3 числовых + Gender_Male (остальные номинальные константны) + 2 порядковых + 5 шкал
        assert_eq!(
            fitted.feature_names(),
            vec![
                "Age", "Height", "Weight", "Gender_Male", "CAEC", "CALC", "FCVC", "NCP", "CH2O",
                "FAF", "TUE"
            ]
        );
        assert_eq!(X.dim(), (3, 11));
        assert_eq!(X[[0, 3]], 1.0);
        assert_eq!(X[[1, 3]], 0.0);
        assert_eq!(X[[1, 4]], 3.0);
        assert_eq!(X[[2, 4]], 0.0);
    }

    #[test]
    fn scale_features_are_rounded_before_scaling() {
        let config = PreprocessorConfig { include_weight: false };
        let (X, _) = Preprocessor::new(config).fit_transform(&sample()).unwrap();

        // FCVC 1.4, 2.5, 2.6 -> 1, 2, 3: симметрично вокруг среднего
        let fcvc = X.column(5);
        assert!((fcvc[0] + fcvc[2]).abs() < 1e-12);
        assert!(fcvc[1].abs() < 1e-12);
    }

    #[test]
    fn missing_values_are_imputed_at_transform() {
        let fitted = Preprocessor::default().fit(&sample()).unwrap();
        let mut incomplete = sample()[0].clone();
        incomplete.age = None;
        incomplete.caec = None;

        let X = fitted.transform(&[incomplete]).unwrap();
        // Медиана возраста (30) совпадает со средним -> 0 после стандартизации
        assert!(X[[0, 0]].abs() < 1e-12);
        // Самое частое CAEC при равенстве частот: "Always" -> код 3
        assert_eq!(X[[0, 3]], 3.0);
        assert!(X.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn unknown_ordinal_category_is_an_error() {
        let fitted = Preprocessor::default().fit(&sample()).unwrap();
        let mut odd = sample()[0].clone();
        odd.calc = Some("Daily".to_string());
        assert!(matches!(
            fitted.transform(&[odd]),
            Err(MlError::UnknownCategory { .. })
        ));
    }
}
