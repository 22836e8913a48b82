//! Типы данных: схема датасета и ответы API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MlError;

/// Данные пациента. Пропуски допустимы, их заполняет импьютер.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Height")]
    pub height: Option<f64>,
    #[serde(rename = "Weight")]
    pub weight: Option<f64>,
    #[serde(rename = "family_history_with_overweight", alias = "family_history")]
    pub family_history: Option<String>,
    #[serde(rename = "FAVC")]
    pub favc: Option<String>,
    #[serde(rename = "FCVC")]
    pub fcvc: Option<f64>,
    #[serde(rename = "NCP")]
    pub ncp: Option<f64>,
    #[serde(rename = "CAEC")]
    pub caec: Option<String>,
    #[serde(rename = "SMOKE")]
    pub smoke: Option<String>,
    #[serde(rename = "CH2O")]
    pub ch2o: Option<f64>,
    #[serde(rename = "SCC")]
    pub scc: Option<String>,
    #[serde(rename = "FAF")]
    pub faf: Option<f64>,
    #[serde(rename = "TUE")]
    pub tue: Option<f64>,
    #[serde(rename = "CALC")]
    pub calc: Option<String>,
    #[serde(rename = "MTRANS")]
    pub mtrans: Option<String>,
}

impl PatientRecord {
    /// Числовое значение признака; `None` для пропусков и категориальных колонок.
    pub fn numeric(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Age => self.age,
            Feature::Height => self.height,
            Feature::Weight => self.weight,
            Feature::Fcvc => self.fcvc,
            Feature::Ncp => self.ncp,
            Feature::Ch2o => self.ch2o,
            Feature::Faf => self.faf,
            Feature::Tue => self.tue,
            _ => None,
        }
    }

    /// Категориальное значение признака; `None` для пропусков и числовых колонок.
    pub fn category(&self, feature: Feature) -> Option<&str> {
        let value = match feature {
            Feature::Gender => &self.gender,
            Feature::FamilyHistory => &self.family_history,
            Feature::Favc => &self.favc,
            Feature::Caec => &self.caec,
            Feature::Smoke => &self.smoke,
            Feature::Scc => &self.scc,
            Feature::Calc => &self.calc,
            Feature::Mtrans => &self.mtrans,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Строка обучающего набора: признаки + целевая метка.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub record: PatientRecord,
    pub target: String,
}

/// Колонки датасета.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Gender,
    Age,
    Height,
    Weight,
    FamilyHistory,
    Favc,
    Fcvc,
    Ncp,
    Caec,
    Smoke,
    Ch2o,
    Scc,
    Faf,
    Tue,
    Calc,
    Mtrans,
}

impl Feature {
    pub const ALL: [Feature; 16] = [
        Feature::Gender,
        Feature::Age,
        Feature::Height,
        Feature::Weight,
        Feature::FamilyHistory,
        Feature::Favc,
        Feature::Fcvc,
        Feature::Ncp,
        Feature::Caec,
        Feature::Smoke,
        Feature::Ch2o,
        Feature::Scc,
        Feature::Faf,
        Feature::Tue,
        Feature::Calc,
        Feature::Mtrans,
    ];

    /// Имя колонки в CSV.
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::Gender => "Gender",
            Feature::Age => "Age",
            Feature::Height => "Height",
            Feature::Weight => "Weight",
            Feature::FamilyHistory => "family_history_with_overweight",
            Feature::Favc => "FAVC",
            Feature::Fcvc => "FCVC",
            Feature::Ncp => "NCP",
            Feature::Caec => "CAEC",
            Feature::Smoke => "SMOKE",
            Feature::Ch2o => "CH2O",
            Feature::Scc => "SCC",
            Feature::Faf => "FAF",
            Feature::Tue => "TUE",
            Feature::Calc => "CALC",
            Feature::Mtrans => "MTRANS",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Уровень ожирения (NObeyesdad), от недостатка веса до ожирения III степени.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObesityLevel {
    #[serde(rename = "Insufficient_Weight")]
    InsufficientWeight,
    #[serde(rename = "Normal_Weight")]
    NormalWeight,
    #[serde(rename = "Overweight_Level_I")]
    OverweightLevelI,
    #[serde(rename = "Overweight_Level_II")]
    OverweightLevelII,
    #[serde(rename = "Obesity_Type_I")]
    ObesityTypeI,
    #[serde(rename = "Obesity_Type_II")]
    ObesityTypeII,
    #[serde(rename = "Obesity_Type_III")]
    ObesityTypeIII,
}

impl ObesityLevel {
    /// В порядке возрастания веса.
    pub const ALL: [ObesityLevel; 7] = [
        ObesityLevel::InsufficientWeight,
        ObesityLevel::NormalWeight,
        ObesityLevel::OverweightLevelI,
        ObesityLevel::OverweightLevelII,
        ObesityLevel::ObesityTypeI,
        ObesityLevel::ObesityTypeII,
        ObesityLevel::ObesityTypeIII,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObesityLevel::InsufficientWeight => "Insufficient_Weight",
            ObesityLevel::NormalWeight => "Normal_Weight",
            ObesityLevel::OverweightLevelI => "Overweight_Level_I",
            ObesityLevel::OverweightLevelII => "Overweight_Level_II",
            ObesityLevel::ObesityTypeI => "Obesity_Type_I",
            ObesityLevel::ObesityTypeII => "Obesity_Type_II",
            ObesityLevel::ObesityTypeIII => "Obesity_Type_III",
        }
    }
}

impl fmt::Display for ObesityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObesityLevel {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObesityLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| MlError::UnknownLabel(s.to_string()))
    }
}

/// Тип подсказки к результату.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    Warning,
    Info,
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub kind: AdviceKind,
    pub message: String,
}

/// Ответ сервиса на запрос предсказания.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub label: String,
    pub level: Option<ObesityLevel>,
    pub display_label: String,
    pub advice: Advice,
    pub model: String,
}
