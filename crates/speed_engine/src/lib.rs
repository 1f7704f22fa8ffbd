//! # Speed Engine
//!
//! Windowed speed estimation over incremental GPS records.
//!
//! Responsibilities:
//! - Reconstruct absolute positions from per-row increments
//! - Group rows into time-threshold windows
//! - Summarize each window boundary from its particle samples
//! - Emit distance / elapsed time / speed per closed window
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{CsvRowSource, SourceConfig};
//! use speed_engine::SpeedEstimator;
//!
//! let config = EstimatorConfig::default();
//! let rows = CsvRowSource::open(path, SourceConfig::from(&config))?;
//!
//! let mut estimator = SpeedEstimator::new(config);
//! let mut estimates = Vec::new();
//! let stats = estimator.run(rows, &mut estimates)?;
//! ```

mod buffer;
mod engine;
mod error;
pub mod geodesy;
mod window;

// Re-exports
pub use buffer::SampleBuffer;
pub use engine::{RunStats, SpeedEstimator};
pub use error::{EngineError, Result};
pub use geodesy::{chord_distance_3d_m, distance_m, haversine_distance_m, EARTH_RADIUS_M};
pub use window::{AccumulatorState, SampleWindow, SampleWindowAccumulator, WindowTransition};

// Re-export contracts types
pub use contracts::{DistanceMode, EstimatorConfig, SpeedEstimate, WindowSummary};
