//! Error types for fundrec operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FundrecError>;

#[derive(Error, Debug)]
pub enum FundrecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("CSV export error: {0}")]
    CsvExport(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("String conversion error: {0}")]
    StringConversion(#[from] std::string::FromUtf8Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl FundrecError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
