//! Estimator configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input file read when none is configured
pub const DEFAULT_INPUT_FILE: &str = "sensoringData_gps_clean_user1_walking_driving-uncertainT-64.csv";

/// Samples averaged into one window summary
pub const DEFAULT_SAMPLES_PER_DISTRIBUTION: usize = 32;

/// Sample values per axis that follow each record line
pub const DEFAULT_SAMPLES_PER_ROW: usize = 64;

/// Upper bound on sample values per axis; buffers are sized from it
pub const MAX_SAMPLES_PER_ROW: usize = 65_536;

/// Minimum window length before a row may close it
pub const DEFAULT_THRESHOLD_MS: f64 = 1000.0;

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Input CSV path (CLI `-f` overrides)
    #[serde(default)]
    pub input: Option<PathBuf>,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Settings {
    /// Input path, falling back to the bundled sample file name
    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE))
    }
}

/// Speed estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Samples averaged per axis when a window is summarized
    pub samples_per_distribution: usize,

    /// Sample values per axis in every row's sample block
    pub samples_per_row: usize,

    /// A row closes the window once `timestamp - window_start` exceeds this
    pub threshold_ms: f64,

    /// Buffer altitude samples and use the 3D chord distance
    pub altitude_mode: bool,

    /// Requested summary mode
    pub summary_mode: SummaryMode,

    /// Stop after this many estimates (None = unlimited)
    pub max_estimates: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            samples_per_distribution: DEFAULT_SAMPLES_PER_DISTRIBUTION,
            samples_per_row: DEFAULT_SAMPLES_PER_ROW,
            threshold_ms: DEFAULT_THRESHOLD_MS,
            altitude_mode: false,
            summary_mode: SummaryMode::default(),
            max_estimates: None,
        }
    }
}

/// How a window's sample buffer is reduced to one position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// Arithmetic mean of the buffered samples
    #[default]
    Direct,
    /// Full per-coordinate distribution; not available, resolves to `Direct`
    Distribution,
}

impl SummaryMode {
    /// Map the `-m` flag value: `"1"` is direct computation, anything else
    /// requests the distribution
    pub fn from_flag(flag: &str) -> Self {
        if flag == "1" {
            SummaryMode::Direct
        } else {
            SummaryMode::Distribution
        }
    }

    /// Mode actually used for computation
    pub fn effective(&self) -> SummaryMode {
        SummaryMode::Direct
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sinks: Vec<SinkKind>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sinks: vec![SinkKind::Console],
        }
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Human-readable lines on stdout
    Console,
    /// Structured tracing events
    Log,
}
