//! LogSink - logs each estimate via tracing

use contracts::{ContractError, EstimateSink, SpeedEstimate};
use tracing::{info, instrument};

/// Sink that emits one structured event per estimate
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_estimate(&self, estimate: &SpeedEstimate) {
        info!(
            sink = %self.name,
            window_index = estimate.window_index,
            start_latitude = estimate.start.latitude,
            start_longitude = estimate.start.longitude,
            finish_latitude = estimate.finish.latitude,
            finish_longitude = estimate.finish.longitude,
            distance_m = estimate.distance_m,
            elapsed_ms = estimate.elapsed_ms,
            speed_m_per_ms = estimate.speed_m_per_ms,
            distance_mode = estimate.distance_mode.label(),
            "SpeedEstimate"
        );
    }
}

impl EstimateSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        level = "trace",
        name = "log_sink_write",
        skip(self, estimate),
        fields(sink = %self.name, window_index = estimate.window_index)
    )]
    fn write(&mut self, estimate: &SpeedEstimate) -> Result<(), ContractError> {
        self.log_estimate(estimate);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
