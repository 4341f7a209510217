use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset has no header row")]
    MissingHeader,

    #[error("Unsupported delimiter {0:?}: must be a single ASCII character")]
    Delimiter(char),

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Column '{column}' has a non-numeric value {value:?} at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, DatasetError>;
