//! Ingestion error types

use std::path::PathBuf;

use contracts::Axis;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Input file could not be opened
    #[error("error opening {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read failure while streaming the input
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed record line or sample value
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based physical line number
        line: usize,
        message: String,
    },

    /// Input ended inside a sample block
    #[error("line {line}: {axis} sample block truncated, expected {expected} values, found {found}")]
    Truncated {
        line: usize,
        axis: Axis,
        expected: usize,
        found: usize,
    },
}

impl IngestionError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
