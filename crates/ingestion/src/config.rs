//! Source configuration and metrics

use contracts::{Axis, EstimatorConfig, DEFAULT_SAMPLES_PER_ROW};

/// Row source configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    /// Values per axis in every sample block
    pub samples_per_row: usize,

    /// Expect an altitude block after the longitude block
    pub altitude_mode: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            samples_per_row: DEFAULT_SAMPLES_PER_ROW,
            altitude_mode: false,
        }
    }
}

impl SourceConfig {
    /// Create new source configuration
    pub fn new(samples_per_row: usize, altitude_mode: bool) -> Self {
        Self {
            samples_per_row,
            altitude_mode,
        }
    }

    /// Axes whose blocks follow each record line, in file order
    pub fn axes(&self) -> &'static [Axis] {
        if self.altitude_mode {
            &[Axis::Latitude, Axis::Longitude, Axis::Altitude]
        } else {
            &[Axis::Latitude, Axis::Longitude]
        }
    }
}

impl From<&EstimatorConfig> for SourceConfig {
    fn from(config: &EstimatorConfig) -> Self {
        Self::new(config.samples_per_row, config.altitude_mode)
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total records parsed
    pub records_read: u64,

    /// Total sample values parsed across all blocks
    pub sample_values_read: u64,

    /// Physical lines consumed, header included
    pub lines_read: u64,

    /// Parse error count
    pub parse_errors: u64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parsed record and its sample count
    pub fn record_received(&mut self, sample_values: usize) {
        self.records_read += 1;
        self.sample_values_read += sample_values as u64;
        metrics::counter!("gps_speed_records_total").increment(1);
    }

    /// Record a consumed physical line
    pub fn record_line(&mut self) {
        self.lines_read += 1;
    }

    /// Record parse error
    pub fn record_parse_error(&mut self) {
        self.parse_errors += 1;
        metrics::counter!("gps_speed_parse_errors_total").increment(1);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.records_read,
            sample_values_read: self.sample_values_read,
            lines_read: self.lines_read,
            parse_errors: self.parse_errors,
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub sample_values_read: u64,
    pub lines_read: u64,
    pub parse_errors: u64,
}
