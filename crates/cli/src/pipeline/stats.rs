//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::MetricsSnapshot as SinkSnapshot;
use ingestion::MetricsSnapshot as IngestionSnapshot;
use speed_engine::RunStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Estimator outcome
    pub run: RunStats,

    /// Reader counters
    pub ingestion: IngestionSnapshot,

    /// Per-sink counters
    pub sinks: Vec<(String, SinkSnapshot)>,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Records processed per second
    pub fn records_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.run.records_read as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Render the end-of-run summary
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Run Summary ===\n");
        out.push_str(&format!("Duration: {:.3}s\n", self.duration.as_secs_f64()));
        out.push_str(&format!("Records read: {}\n", self.run.records_read));
        out.push_str(&format!(
            "Sample values read: {}\n",
            self.ingestion.sample_values_read
        ));
        out.push_str(&format!("Records/s: {:.2}\n", self.records_per_second()));
        out.push_str(&format!("Estimates: {}\n", self.run.estimates_emitted));
        out.push_str(&format!(
            "Rows inside windows: {}\n",
            self.run.rows_discarded
        ));
        out.push_str(&format!(
            "Trailing rows dropped: {}\n",
            self.run.trailing_rows_dropped
        ));
        if self.run.stopped_early {
            out.push_str("Stopped early: estimate limit reached\n");
        }

        for (name, sink) in &self.sinks {
            out.push_str(&format!(
                "Sink {}: {} written, {} failed\n",
                name, sink.write_count, sink.failure_count
            ));
        }

        out.push('\n');
        out.push_str(&self.run.metrics.to_string());
        out
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("{}", self.render_summary());
    }
}
