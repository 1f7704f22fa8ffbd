//! Engine error types

use contracts::ContractError;
use ingestion::IngestionError;
use thiserror::Error;

/// Error raised while driving a record stream through the estimator
#[derive(Debug, Error)]
pub enum EngineError {
    /// Window or sink contract violated
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Record stream failed
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}

/// Engine Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
