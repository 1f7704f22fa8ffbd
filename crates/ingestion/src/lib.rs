//! # Ingestion
//!
//! GPS record ingestion module.
//!
//! Responsibilities:
//! - Open the incremental GPS record file
//! - Skip the header and parse each 11-field record line
//! - Read the per-row latitude/longitude/(altitude) sample blocks
//! - Fail fast on malformed or truncated records
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{CsvRowSource, SourceConfig};
//!
//! let mut rows = CsvRowSource::open(path, SourceConfig::new(64, false))?;
//! while let Some(record) = rows.next_record()? {
//!     // Process record
//! }
//! ```

mod config;
mod error;
mod source;

// Re-exports
pub use config::{IngestionMetrics, MetricsSnapshot, SourceConfig};
pub use contracts::GpsRecord;
pub use error::{IngestionError, Result};
pub use source::{CsvRowSource, RECORD_FIELD_COUNT};
