//! Error types for SortBench operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SortBenchError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed config name: {0}")]
    MalformedConfigName(String),

    #[error("Cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },

    #[error("Model {0} is not supported by any configured provider")]
    UnsupportedModel(String),

    #[error("Inference failed for model {model}: {reason}")]
    Inference { model: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for SortBench operations
pub type Result<T> = std::result::Result<T, SortBenchError>;
