//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use contracts::SinkKind;

/// gps-speed - speed estimation from incremental GPS records
#[derive(Parser, Debug)]
#[command(
    name = "gps-speed",
    author,
    version,
    about = "Windowed speed estimation from incremental GPS records",
    long_about = "Reads incremental GPS records with per-row particle samples, groups them \n\
                  into time-threshold windows, and prints the estimated speed between \n\
                  consecutive window boundaries."
)]
pub struct Cli {
    /// Input record file
    #[arg(
        short = 'f',
        long = "file",
        env = "GPS_SPEED_FILE",
        value_name = "PATH"
    )]
    pub file: Option<PathBuf>,

    /// Samples averaged per window summary [default: 32]
    #[arg(short = 's', long = "samples", env = "GPS_SPEED_SAMPLES", value_name = "N")]
    pub samples: Option<usize>,

    /// Summary mode: 1 = direct mean; any other value requests the distribution mode
    /// [default: settings file, else direct]
    #[arg(
        short = 'm',
        long = "mode",
        env = "GPS_SPEED_MODE",
        value_name = "MODE",
        allow_hyphen_values = true
    )]
    pub mode: Option<String>,

    /// Settings file (TOML or JSON)
    #[arg(long, env = "GPS_SPEED_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sample values per axis following each record [default: 64]
    #[arg(long, env = "GPS_SPEED_SAMPLES_PER_ROW", value_name = "N")]
    pub samples_per_row: Option<usize>,

    /// Minimum window length in milliseconds [default: 1000]
    #[arg(long, env = "GPS_SPEED_THRESHOLD_MS", value_name = "MS")]
    pub threshold_ms: Option<f64>,

    /// Read altitude sample blocks and use the 3D chord distance
    #[arg(long, env = "GPS_SPEED_ALTITUDE")]
    pub altitude: bool,

    /// Stop after this many estimates
    #[arg(long, env = "GPS_SPEED_MAX_ESTIMATES", value_name = "N")]
    pub max_estimates: Option<u64>,

    /// Output sink (repeatable)
    #[arg(long = "sink", value_enum, value_name = "SINK")]
    pub sinks: Vec<SinkArg>,

    /// Validate configuration and exit without reading records
    #[arg(long)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "GPS_SPEED_VERBOSE")]
    pub verbose: u8,

    /// Suppress log output below warnings
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        env = "GPS_SPEED_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

/// Output sink selector
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkArg {
    /// Human-readable report on stdout
    Console,
    /// Structured tracing events
    Log,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Console => SinkKind::Console,
            SinkArg::Log => SinkKind::Log,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
