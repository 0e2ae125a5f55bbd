//! Error types for askdata.
//!
//! Failures while answering a question are not errors in this sense: they are
//! reported as [`QueryResult::Error`](crate::query::QueryResult) values. The
//! types here cover loading data, reading configuration and the optional
//! embedding model.

use thiserror::Error;

/// Main error type for askdata operations.
#[derive(Error, Debug)]
pub enum AskDataError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while building or loading a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Row has {got} values, expected {expected}")]
    RowWidth { expected: usize, got: usize },

    #[error("Empty column name at position {0}")]
    EmptyColumnName(usize),

    #[error("Data frame error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Failed to read data: {0}")]
    Io(#[from] std::io::Error),
}

/// Embedding-related errors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Embedding failed: {0}")]
    Inference(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Result type alias for askdata operations.
pub type Result<T> = std::result::Result<T, AskDataError>;
