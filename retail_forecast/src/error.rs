//! Error types for the retail_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the retail_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("data error: {0}")]
    DataError(String),

    /// Error related to feature construction
    #[error("feature error: {0}")]
    FeatureError(String),

    /// Error from model training or prediction
    #[error("model error: {0}")]
    ModelError(String),

    /// Error related to argument validation
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),

    /// Error from the raw data layer
    #[error(transparent)]
    SourceError(#[from] retail_data::DataError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
