//! Чтение и запись CSV датасета

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};
use crate::types::{LabeledRecord, PatientRecord};

/// Строка CSV в том виде, в каком она лежит на диске.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Height")]
    pub height: Option<f64>,
    #[serde(rename = "Weight")]
    pub weight: Option<f64>,
    #[serde(rename = "family_history_with_overweight")]
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
    #[serde(rename = "NObeyesdad")]
    pub target: Option<String>,
}

impl DatasetRow {
    fn into_labeled(self, row: usize) -> Result<LabeledRecord> {
        let target = self
            .target
            .filter(|t| !t.trim().is_empty())
            .ok_or(MlError::MissingTarget(row))?;

        Ok(LabeledRecord {
            record: PatientRecord {
                gender: self.gender,
                age: self.age,
                height: self.height,
                weight: self.weight,
                family_history: self.family_history,
                favc: self.favc,
                fcvc: self.fcvc,
                ncp: self.ncp,
                caec: self.caec,
                smoke: self.smoke,
                ch2o: self.ch2o,
                scc: self.scc,
                faf: self.faf,
                tue: self.tue,
                calc: self.calc,
                mtrans: self.mtrans,
            },
            target,
        })
    }
}

impl From<&LabeledRecord> for DatasetRow {
    fn from(labeled: &LabeledRecord) -> Self {
        let r = labeled.record.clone();
        Self {
            gender: r.gender,
            age: r.age,
            height: r.height,
            weight: r.weight,
            family_history: r.family_history,
            favc: r.favc,
            fcvc: r.fcvc,
            ncp: r.ncp,
            caec: r.caec,
            smoke: r.smoke,
            ch2o: r.ch2o,
            scc: r.scc,
            faf: r.faf,
            tue: r.tue,
            calc: r.calc,
            mtrans: r.mtrans,
            target: Some(labeled.target.clone()),
        }
    }
}

/// Если файл не найден, пробуем `data/obesity.csv` и `../data/obesity.csv`.
pub fn resolve_dataset_path(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }

    ["data/obesity.csv", "../data/obesity.csv"]
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

pub fn load_dataset(path: &Path) -> Result<Vec<LabeledRecord>> {
    let path = resolve_dataset_path(path);
    tracing::info!("Loading dataset from {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<DatasetRow>().enumerate() {
        records.push(row?.into_labeled(i)?);
    }

    if records.is_empty() {
        return Err(MlError::EmptyDataset);
    }

    tracing::info!("Loaded {} rows", records.len());
    Ok(records)
}

pub fn write_dataset(path: &Path, records: &[LabeledRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(DatasetRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Gender,Age,Height,Weight,family_history_with_overweight,FAVC,FCVC,NCP,CAEC,SMOKE,CH2O,SCC,FAF,TUE,CALC,MTRANS,NObeyesdad";

    #[test]
    fn empty_cells_become_missing_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(
            file,
            "Female,,1.62,64,yes,no,2,3,Sometimes,no,2,no,0,1,no,Public_Transportation,Normal_Weight"
        )
        .unwrap();
        writeln!(
            file,
            "Male,23,1.80,,,yes,3,3,Frequently,no,2,no,1,0,Sometimes,Walking,Overweight_Level_I"
        )
        .unwrap();

        let records = load_dataset(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record.age, None);
        assert_eq!(records[0].record.height, Some(1.62));
        assert_eq!(records[1].record.weight, None);
        assert_eq!(records[1].record.family_history, None);
        assert_eq!(records[1].target, "Overweight_Level_I");
    }

    #[test]
    fn missing_target_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(
            file,
            "Female,21,1.62,64,yes,no,2,3,Sometimes,no,2,no,0,1,no,Public_Transportation,"
        )
        .unwrap();

        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, MlError::MissingTarget(0)));
    }

    #[test]
    fn written_dataset_can_be_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("obesity.csv");
        let rows = vec![LabeledRecord {
            record: PatientRecord {
                gender: Some("Male".to_string()),
                age: Some(40.0),
                weight: Some(95.5),
                ..Default::default()
            },
            target: "Overweight_Level_II".to_string(),
        }];

        write_dataset(&path, &rows).unwrap();
        let loaded = load_dataset(&path).unwrap();
        assert_eq!(loaded, rows);
    }
}
