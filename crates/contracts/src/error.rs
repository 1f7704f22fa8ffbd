//! Layered error definitions
//!
//! Categorized by source: config / window / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Window Errors =====
    /// Summary requested more samples than the window buffered
    #[error("cannot summarize {requested} samples, only {available} buffered")]
    InsufficientSamples { requested: usize, available: usize },

    /// Sample buffer is already full
    #[error("sample buffer capacity {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    /// Sample block does not match the configured axis layout
    #[error("sample block mismatch on '{axis}': {message}")]
    SampleLayout { axis: String, message: String },

    /// Row pushed after the stream was closed
    #[error("window accumulator already exhausted")]
    StreamExhausted,

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sample layout error
    pub fn sample_layout(axis: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SampleLayout {
            axis: axis.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
