// Error type shared by every stage of the analysis.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("target column '{0}' is missing")]
    TargetColumnMissing(String),

    #[error("target column '{column}' has non-binary value {value} at row {row}")]
    InvalidTarget { column: String, row: usize, value: String },

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{column}' is {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("length mismatch: expected {expected}, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("invalid value {value} in column '{column}' at row {row}")]
    InvalidValue { column: String, row: usize, value: f64 },

    #[error("unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("not enough samples: {0}")]
    NotEnoughSamples(String),

    #[error("metric undefined: {0}")]
    UndefinedMetric(String),

    #[error(transparent)]
    Linfa(#[from] linfa::Error),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("chart error: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(feature = "charts")]
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for AnalysisError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        AnalysisError::Chart(err.to_string())
    }
}
