use thiserror::Error;

/// Convenience result type for table transformations.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Error type returned by pipeline stages.
///
/// This is a single error enum shared by every stage. Any error aborts the pipeline run that
/// produced it; no stage swallows an error or substitutes a default value for one.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The table does not have the expected shape (missing/duplicate columns, ragged rows).
    #[error("schema mismatch: {message}")]
    Schema { message: String },

    /// A value could not be coerced into the type a stage requires.
    #[error("failed to coerce value at row {row} column '{column}': {message} (raw='{raw}')")]
    TypeCoercion {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A value is missing where the stage cannot tolerate one.
    #[error("missing value at row {row} column '{column}'")]
    MissingValue { row: usize, column: String },

    /// The oversampler cannot rebalance the target column.
    #[error("insufficient class diversity in '{column}': {message}")]
    ClassImbalance { column: String, message: String },

    /// The pipeline description is inconsistent.
    #[error("invalid pipeline configuration: {message}")]
    InvalidConfig { message: String },

    /// Pipeline configuration could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pipeline configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeatureError {
    pub(crate) fn missing_column(column: &str) -> Self {
        FeatureError::Schema {
            message: format!("missing required column '{column}'"),
        }
    }
}
