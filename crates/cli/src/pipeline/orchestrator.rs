//! Pipeline orchestrator - wires the record source, estimator and sinks.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::Settings;
use dispatcher::create_dispatcher;
use ingestion::{CsvRowSource, IngestionError, SourceConfig};
use speed_engine::SpeedEstimator;
use tracing::{info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated settings
    pub settings: Settings,

    /// Record file to read
    pub input: PathBuf,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Estimates written before a failure stay on the sinks; the sinks are
    /// shut down on both paths.
    pub fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let PipelineConfig { settings, input } = self.config;

        let mut source = CsvRowSource::open(&input, SourceConfig::from(&settings.estimator))
            .map_err(|e| match e {
                IngestionError::Open { path, source } => {
                    CliError::input_open(path.display().to_string(), source.to_string())
                }
                other => CliError::pipeline_execution(other.to_string()),
            })?;

        let mut dispatcher = create_dispatcher(&settings.output.sinks)
            .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

        info!(
            input = %input.display(),
            samples_per_distribution = settings.estimator.samples_per_distribution,
            samples_per_row = settings.estimator.samples_per_row,
            threshold_ms = settings.estimator.threshold_ms,
            altitude_mode = settings.estimator.altitude_mode,
            sinks = dispatcher.sink_count(),
            "Starting speed estimation"
        );

        let mut estimator = SpeedEstimator::new(settings.estimator.clone());
        let outcome = estimator.run(&mut source, &mut dispatcher);

        let shutdown = dispatcher.shutdown();
        let run_stats = outcome
            .map_err(|e| {
                warn!(line = source.line_number(), error = %e, "Run aborted");
                CliError::pipeline_execution(e.to_string())
            })
            .context("Speed estimation failed")?;
        shutdown
            .map_err(|e| CliError::shutdown(e.to_string()))
            .context("Failed to close sinks")?;

        Ok(PipelineStats {
            run: run_stats,
            ingestion: source.metrics(),
            sinks: dispatcher.metrics(),
            duration: start_time.elapsed(),
        })
    }
}
