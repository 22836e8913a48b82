//! Пайплайн: препроцессор + классификатор как единое целое

#![allow(non_snake_case)]

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::{Classifier, ModelSpec, TrainedModel};
use crate::error::Result;
use crate::preprocessing::{FittedPreprocessor, Preprocessor, PreprocessorConfig};
use crate::types::PatientRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub preprocessor: PreprocessorConfig,
    pub model: ModelSpec,
}

impl Pipeline {
    pub fn new(preprocessor: PreprocessorConfig, model: ModelSpec) -> Self {
        Self { preprocessor, model }
    }

    pub fn name(&self) -> &'static str {
        self.model.name()
    }

    /// Препроцессор обучается только на переданных строках, поэтому внутри
    /// кросс-валидации статистики валидационного фолда не утекают.
    pub fn fit(
        &self,
        records: &[PatientRecord],
        targets: &Array1<usize>,
        n_classes: usize,
    ) -> Result<TrainedPipeline> {
        let (X, preprocessor) = Preprocessor::new(self.preprocessor).fit_transform(records)?;
        let model = self.model.fit(&X, targets, n_classes)?;
        Ok(TrainedPipeline { preprocessor, model })
    }
}

#[derive(Serialize, Deserialize)]
pub struct TrainedPipeline {
    pub preprocessor: FittedPreprocessor,
    pub model: TrainedModel,
}

impl TrainedPipeline {
    pub fn name(&self) -> &'static str {
        self.model.name()
    }

    pub fn predict(&self, records: &[PatientRecord]) -> Result<Array1<usize>> {
        let X = self.preprocessor.transform(records)?;
        self.model.predict(&X)
    }
}
