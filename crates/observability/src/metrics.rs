//! Speed estimation metrics.
//!
//! Facade counters and histograms recorded per estimate, plus an in-memory
//! aggregator for the end-of-run summary.

use contracts::SpeedEstimate;
use metrics::{counter, gauge, histogram};

/// Record facade metrics for one emitted estimate
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_estimate_metrics;
///
/// if let Some(estimate) = estimator.process(&record)? {
///     record_estimate_metrics(&estimate);
/// }
/// ```
pub fn record_estimate_metrics(estimate: &SpeedEstimate) {
    counter!(
        "gps_speed_estimates_total",
        "distance_mode" => estimate.distance_mode.label()
    )
    .increment(1);

    gauge!("gps_speed_last_window_index").set(estimate.window_index as f64);
    histogram!("gps_speed_window_elapsed_ms").record(estimate.elapsed_ms);

    if estimate.is_finite() {
        histogram!("gps_speed_distance_m").record(estimate.distance_m);
        histogram!("gps_speed_m_per_s").record(estimate.speed_m_per_s());
    } else {
        counter!("gps_speed_non_finite_total").increment(1);
    }
}

/// Record rows absorbed by a window without producing an estimate
pub fn record_rows_discarded(count: u64) {
    if count > 0 {
        counter!("gps_speed_rows_discarded_total").increment(count);
    }
}

/// Record an estimate handed to a sink
pub fn record_estimate_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "gps_speed_estimates_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Speed metrics aggregator
///
/// Non-finite estimates are counted but kept out of the running statistics.
#[derive(Debug, Clone, Default)]
pub struct SpeedMetricsAggregator {
    pub total_estimates: u64,
    pub non_finite_estimates: u64,
    pub speed_stats: RunningStats,
    pub distance_stats: RunningStats,
    pub elapsed_stats: RunningStats,
    pub total_distance_m: f64,
    pub total_elapsed_ms: f64,
}

impl SpeedMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, estimate: &SpeedEstimate) {
        self.total_estimates += 1;
        self.elapsed_stats.observe(estimate.elapsed_ms);
        self.total_elapsed_ms += estimate.elapsed_ms;

        if !estimate.is_finite() {
            self.non_finite_estimates += 1;
            return;
        }

        self.speed_stats.observe(estimate.speed_m_per_s());
        self.distance_stats.observe(estimate.distance_m);
        self.total_distance_m += estimate.distance_m;
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_estimates: self.total_estimates,
            non_finite_estimates: self.non_finite_estimates,
            total_distance_m: self.total_distance_m,
            total_elapsed_ms: self.total_elapsed_ms,
            speed_m_per_s: StatsSummary::from(&self.speed_stats),
            distance_m: StatsSummary::from(&self.distance_stats),
            elapsed_ms: StatsSummary::from(&self.elapsed_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_estimates: u64,
    pub non_finite_estimates: u64,
    pub total_distance_m: f64,
    pub total_elapsed_ms: f64,
    pub speed_m_per_s: StatsSummary,
    pub distance_m: StatsSummary,
    pub elapsed_ms: StatsSummary,
}

impl MetricsSummary {
    /// Overall speed: total distance over total elapsed time (m/s)
    pub fn average_speed_m_per_s(&self) -> Option<f64> {
        (self.total_elapsed_ms > 0.0).then(|| self.total_distance_m / self.total_elapsed_ms * 1000.0)
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Speed Estimation Summary ===")?;
        writeln!(f, "Estimates: {}", self.total_estimates)?;
        if self.non_finite_estimates > 0 {
            writeln!(f, "Non-finite estimates: {}", self.non_finite_estimates)?;
        }
        writeln!(f, "Total distance (m): {:.3}", self.total_distance_m)?;
        writeln!(f, "Total elapsed (ms): {:.3}", self.total_elapsed_ms)?;
        if let Some(average) = self.average_speed_m_per_s() {
            writeln!(f, "Average speed (m/s): {:.3}", average)?;
        }
        writeln!(f, "Speed (m/s): {}", self.speed_m_per_s)?;
        writeln!(f, "Distance (m): {}", self.distance_m)?;
        writeln!(f, "Window elapsed (ms): {}", self.elapsed_ms)?;
        Ok(())
    }
}

/// Distribution of one estimate quantity over a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    /// `(min, max)`; `None` until a value is observed
    pub range: Option<(f64, f64)>,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.len(),
            range: stats.range(),
            mean: stats.mean().unwrap_or(0.0),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.range {
            None => f.write_str("N/A"),
            Some((lo, hi)) => write!(
                f,
                "n={} mean={:.3} std={:.3} range=[{:.3}, {:.3}]",
                self.count, self.mean, self.std_dev, lo, hi
            ),
        }
    }
}

/// Streaming mean, spread and range of a series of values
///
/// Mean and squared deviation are updated in place (Welford), so no
/// values are retained.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    n: u64,
    mean: f64,
    sq_dev: f64,
    range: Option<(f64, f64)>,
}

impl RunningStats {
    pub fn observe(&mut self, value: f64) {
        self.n += 1;
        let shift = value - self.mean;
        self.mean += shift / self.n as f64;
        self.sq_dev += shift * (value - self.mean);

        self.range = Some(match self.range {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
    }

    pub fn len(&self) -> u64 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    /// Unbiased sample variance; zero below two observations
    pub fn variance(&self) -> f64 {
        match self.n {
            0 | 1 => 0.0,
            n => self.sq_dev / (n - 1) as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }
}
