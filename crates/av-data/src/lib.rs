//! Station data loading and the in-memory dataset store

pub mod config;
pub mod sources;
pub mod store;

use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use config::{ColumnMapping, DashboardConfig, NullConfig};
pub use sources::CsvStationSource;
pub use store::{Dataset, StationRecord};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Column '{0}' not found in CSV header")]
    MissingColumn(String),

    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::Config(error.to_string())
    }
}
