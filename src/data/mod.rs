//! Загрузка, разбиение и генерация данных

pub mod loader;
pub mod split;
pub mod synthetic;

pub use loader::{load_dataset, resolve_dataset_path, write_dataset, DatasetRow};
pub use split::{train_test_split, StratifiedKFold};
pub use synthetic::generate;
