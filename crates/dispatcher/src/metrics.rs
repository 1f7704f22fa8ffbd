//! Per-sink write counters

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    write_count: u64,
    failure_count: u64,
    flush_count: u64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    pub fn inc_write_count(&mut self) {
        self.write_count += 1;
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn inc_failure_count(&mut self) {
        self.failure_count += 1;
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    pub fn inc_flush_count(&mut self) {
        self.flush_count += 1;
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.write_count,
            failure_count: self.failure_count,
            flush_count: self.flush_count,
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub flush_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut metrics = SinkMetrics::new();
        metrics.inc_write_count();
        metrics.inc_write_count();
        metrics.inc_failure_count();
        metrics.inc_flush_count();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                write_count: 2,
                failure_count: 1,
                flush_count: 1,
            }
        );
    }
}
