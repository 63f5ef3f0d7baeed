use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the encoding, training and inference pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("target column '{0}' not found after normalizing column names")]
    MissingTarget(String),

    #[error("column '{column}' expects numeric values, found '{value}' on row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("dataset has no complete rows")]
    EmptyDataset,

    #[error("need at least {required} rows to split into train/test partitions, got {found}")]
    NotEnoughRows { required: usize, found: usize },

    #[error("test ratio must be in (0, 1), got {0}")]
    InvalidTestRatio(f64),

    #[error("cannot fit encoder for column '{0}' without any labels")]
    EmptyEncoder(String),

    #[error("no encoder fitted for column '{0}'")]
    UnknownEncoder(String),

    #[error("encoder for column '{column}' is invalid: {reason}")]
    InvalidEncoder { column: String, reason: String },

    #[error("artifact schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' has an invalid value: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("label '{label}' was never seen for column '{column}'")]
    UnseenLabel { column: String, label: String },

    #[error("model has not been fitted")]
    ModelNotFitted,

    #[error("feature vector has {found} values, model expects {expected}")]
    FeatureLength { expected: usize, found: usize },

    #[error("model produced a non-finite prediction ({0})")]
    NonFinitePrediction(f32),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error was caused by the caller's record rather than by
    /// the artifacts or the process. The serving boundary maps these to 400.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingField(_)
                | PipelineError::InvalidField { .. }
                | PipelineError::MalformedRecord(_)
                | PipelineError::UnseenLabel { .. }
        )
    }
}
