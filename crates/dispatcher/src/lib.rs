//! # Dispatcher
//!
//! Estimate output fan-out.
//!
//! Responsibilities:
//! - Consume `SpeedEstimate`s
//! - Fan out to every configured sink, in order
//! - Count writes per sink and surface the first failure
//! - Flush and close all sinks on shutdown

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;

pub use contracts::{EstimateSink, SinkKind, SpeedEstimate};
pub use dispatcher::{create_dispatcher, create_sink, Dispatcher};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{ConsoleSink, LogSink};
