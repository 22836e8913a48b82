//! Модуль предобработки данных

pub mod column_transformer;
pub mod encoding;
pub mod imputation;
pub mod normalization;

pub use column_transformer::{FittedPreprocessor, Preprocessor, PreprocessorConfig};
pub use encoding::{LabelEncoder, OneHotEncoder, OrdinalEncoder};
pub use imputation::{MedianImputer, MostFrequentImputer};
pub use normalization::StandardScaler;
