//! Speed estimator driving the window accumulator.

use contracts::{
    ContractError, DistanceMode, EstimateSink, EstimatorConfig, GpsRecord, SpeedEstimate,
    SummaryMode,
};
use ingestion::IngestionError;
use observability::{MetricsSummary, SpeedMetricsAggregator};
use tracing::instrument;

use crate::error::Result;
use crate::geodesy::distance_m;
use crate::window::{AccumulatorState, SampleWindowAccumulator, WindowTransition};

/// Outcome of a complete run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub records_read: u64,
    pub estimates_emitted: u64,
    /// Rows absorbed inside windows without closing them
    pub rows_discarded: u64,
    /// Rows of the trailing window dropped at end of input
    pub trailing_rows_dropped: u64,
    /// Run ended because `max_estimates` was reached
    pub stopped_early: bool,
    pub metrics: MetricsSummary,
}

/// Turns a record stream into per-window speed estimates
#[derive(Debug)]
pub struct SpeedEstimator {
    config: EstimatorConfig,
    distance_mode: DistanceMode,
    accumulator: SampleWindowAccumulator,
    /// Index assigned to the next estimate
    next_index: u64,
    aggregator: SpeedMetricsAggregator,
}

impl SpeedEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        if config.summary_mode != config.summary_mode.effective() {
            tracing::warn!(
                requested = ?config.summary_mode,
                "distribution summary is not available, using direct mean computation"
            );
        }

        let accumulator = SampleWindowAccumulator::new(&config);
        Self {
            distance_mode: DistanceMode::from_altitude_mode(config.altitude_mode),
            config,
            accumulator,
            next_index: 0,
            aggregator: SpeedMetricsAggregator::new(),
        }
    }

    /// Feed one record
    ///
    /// Returns an estimate when the record closes the open window.
    #[instrument(
        level = "trace",
        name = "speed_estimator_process",
        skip(self, record),
        fields(record_id = record.id)
    )]
    pub fn process(
        &mut self,
        record: &GpsRecord,
    ) -> std::result::Result<Option<SpeedEstimate>, ContractError> {
        let Some(transition) = self.accumulator.push(record)? else {
            return Ok(None);
        };

        let estimate = self.estimate(transition);
        if !estimate.is_finite() {
            tracing::warn!(
                window_index = estimate.window_index,
                distance_m = estimate.distance_m,
                start_latitude = estimate.start.latitude,
                finish_latitude = estimate.finish.latitude,
                "non-finite speed estimate"
            );
        }

        tracing::debug!(
            window_index = estimate.window_index,
            distance_m = estimate.distance_m,
            elapsed_ms = estimate.elapsed_ms,
            speed_m_per_ms = estimate.speed_m_per_ms,
            "window closed"
        );

        observability::record_estimate_metrics(&estimate);
        self.aggregator.update(&estimate);
        Ok(Some(estimate))
    }

    fn estimate(&mut self, transition: WindowTransition) -> SpeedEstimate {
        let distance_m = distance_m(self.distance_mode, &transition.start, &transition.finish);
        let window_index = self.next_index;
        self.next_index += 1;

        SpeedEstimate {
            window_index,
            start: transition.start,
            finish: transition.finish,
            distance_m,
            elapsed_ms: transition.elapsed_ms,
            speed_m_per_ms: distance_m / transition.elapsed_ms,
            closing_timestamp_ms: transition.closing_timestamp_ms,
            distance_mode: self.distance_mode,
        }
    }

    /// Drive a whole record stream into `sink`
    ///
    /// Stops at the first error, or once `max_estimates` estimates have been
    /// written. The trailing partial window is dropped.
    #[instrument(name = "speed_estimator_run", skip_all, fields(sink = sink.name()))]
    pub fn run<I, S>(&mut self, records: I, sink: &mut S) -> Result<RunStats>
    where
        I: IntoIterator<Item = std::result::Result<GpsRecord, IngestionError>>,
        S: EstimateSink + ?Sized,
    {
        let mut stats = RunStats::default();

        for record in records {
            let record = record?;
            stats.records_read += 1;

            if let Some(estimate) = self.process(&record)? {
                sink.write(&estimate)?;
                stats.estimates_emitted += 1;

                if self.limit_reached(stats.estimates_emitted) {
                    tracing::info!(
                        max_estimates = stats.estimates_emitted,
                        "estimate limit reached, stopping"
                    );
                    stats.stopped_early = true;
                    break;
                }
            }
        }

        stats.trailing_rows_dropped = self.accumulator.finish();
        if stats.trailing_rows_dropped > 0 {
            tracing::debug!(
                rows = stats.trailing_rows_dropped,
                "trailing partial window dropped"
            );
        }

        sink.flush()?;

        stats.rows_discarded = self.accumulator.rows_discarded();
        stats.metrics = self.aggregator.summary();
        observability::record_rows_discarded(stats.rows_discarded);

        tracing::info!(
            records = stats.records_read,
            estimates = stats.estimates_emitted,
            rows_discarded = stats.rows_discarded,
            trailing_rows_dropped = stats.trailing_rows_dropped,
            "run complete"
        );

        Ok(stats)
    }

    fn limit_reached(&self, emitted: u64) -> bool {
        self.config.max_estimates.is_some_and(|max| emitted >= max)
    }

    /// Discard all state so a fresh stream can be processed
    pub fn reset(&mut self) {
        self.accumulator = SampleWindowAccumulator::new(&self.config);
        self.next_index = 0;
        self.aggregator.reset();
    }

    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    #[inline]
    pub fn distance_mode(&self) -> DistanceMode {
        self.distance_mode
    }

    /// Estimates produced so far
    #[inline]
    pub fn estimate_count(&self) -> u64 {
        self.next_index
    }

    #[inline]
    pub fn state(&self) -> AccumulatorState {
        self.accumulator.state()
    }

    /// Summary mode in effect
    pub fn summary_mode(&self) -> SummaryMode {
        self.config.summary_mode.effective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::{chord_distance_3d_m, haversine_distance_m};
    use contracts::{GpsIncrement, SampleBlock};

    fn config() -> EstimatorConfig {
        EstimatorConfig {
            samples_per_distribution: 2,
            samples_per_row: 2,
            threshold_ms: 1000.0,
            ..Default::default()
        }
    }

    fn record(timestamp_ms: f64, dlat: f64, dlon: f64) -> GpsRecord {
        GpsRecord {
            id: timestamp_ms as i64,
            user_id: 1,
            timestamp_ms,
            increment: GpsIncrement {
                latitude: dlat,
                longitude: dlon,
                altitude: 0.0,
            },
            speed: 0.0,
            bearing: 0.0,
            accuracy: 3.0,
            activity_id: 1,
            activity_label: "driving".to_string(),
            samples: SampleBlock {
                latitude: vec![0.0, 0.0],
                longitude: vec![0.0, 0.0],
                altitude: None,
            },
        }
    }

    fn ok_stream(records: Vec<GpsRecord>) -> Vec<std::result::Result<GpsRecord, IngestionError>> {
        records.into_iter().map(Ok).collect()
    }

    #[test]
    fn test_two_records_one_estimate() {
        let mut estimator = SpeedEstimator::new(config());
        assert!(estimator.process(&record(0.0, 45.0, 7.0)).unwrap().is_none());

        let estimate = estimator
            .process(&record(1200.0, 0.001, 0.0))
            .unwrap()
            .unwrap();

        let expected = haversine_distance_m(45.0, 7.0, 45.001, 7.0);
        assert_eq!(estimate.window_index, 0);
        assert_eq!(estimate.elapsed_ms, 1200.0);
        assert_eq!(estimate.distance_mode, DistanceMode::Haversine);
        assert!((estimate.distance_m - expected).abs() < 1e-6);
        assert!((estimate.speed_m_per_ms - expected / 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_index_increments() {
        let mut estimator = SpeedEstimator::new(config());
        let mut sink: Vec<SpeedEstimate> = Vec::new();
        let records = ok_stream(vec![
            record(0.0, 10.0, 10.0),
            record(1100.0, 0.001, 0.0),
            record(1500.0, 0.001, 0.0),
            record(2300.0, 0.001, 0.0),
        ]);

        let stats = estimator.run(records, &mut sink).unwrap();
        assert_eq!(stats.records_read, 4);
        assert_eq!(stats.estimates_emitted, 2);
        assert_eq!(stats.rows_discarded, 1);
        assert_eq!(stats.trailing_rows_dropped, 0);
        assert_eq!(sink[0].window_index, 0);
        assert_eq!(sink[1].window_index, 1);
        assert_eq!(sink[1].start, sink[0].finish);
        assert_eq!(sink[1].elapsed_ms, 1200.0);
    }

    #[test]
    fn test_trailing_window_dropped() {
        let mut estimator = SpeedEstimator::new(config());
        let mut sink: Vec<SpeedEstimate> = Vec::new();
        let records = ok_stream(vec![
            record(0.0, 1.0, 1.0),
            record(1500.0, 0.0, 0.0),
            record(1800.0, 0.0, 0.0),
            record(2100.0, 0.0, 0.0),
        ]);

        let stats = estimator.run(records, &mut sink).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(stats.trailing_rows_dropped, 2);
        assert_eq!(estimator.state(), AccumulatorState::StreamExhausted);
    }

    #[test]
    fn test_max_estimates_stops_early() {
        let cfg = EstimatorConfig {
            max_estimates: Some(1),
            ..config()
        };
        let mut estimator = SpeedEstimator::new(cfg);
        let mut sink: Vec<SpeedEstimate> = Vec::new();
        let records = ok_stream(
            (0..6)
                .map(|i| record(i as f64 * 1100.0, 0.001, 0.001))
                .collect(),
        );

        let stats = estimator.run(records, &mut sink).unwrap();
        assert!(stats.stopped_early);
        assert_eq!(stats.estimates_emitted, 1);
        assert_eq!(stats.records_read, 2);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_altitude_mode_uses_chord() {
        let cfg = EstimatorConfig {
            altitude_mode: true,
            ..config()
        };
        let mut estimator = SpeedEstimator::new(cfg);

        let mut first = record(0.0, 45.0, 7.0);
        first.increment.altitude = 100.0;
        first.samples.altitude = Some(vec![0.0, 0.0]);
        let mut second = record(2000.0, 0.0, 0.0);
        second.increment.altitude = 50.0;
        second.samples.altitude = Some(vec![0.0, 0.0]);

        estimator.process(&first).unwrap();
        let estimate = estimator.process(&second).unwrap().unwrap();

        let expected = chord_distance_3d_m(45.0, 7.0, 100.0, 45.0, 7.0, 150.0);
        assert_eq!(estimate.distance_mode, DistanceMode::Chord3d);
        assert!((estimate.distance_m - expected).abs() < 1e-6);
        assert!((estimate.distance_m - 50.0).abs() < 1e-3);
        assert!((estimate.speed_m_per_ms - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_ingestion_error_aborts_run() {
        let mut estimator = SpeedEstimator::new(config());
        let mut sink: Vec<SpeedEstimate> = Vec::new();
        let records = vec![
            Ok(record(0.0, 1.0, 1.0)),
            Err(IngestionError::parse(6, "bad field")),
            Ok(record(1500.0, 1.0, 1.0)),
        ];

        let err = estimator.run(records, &mut sink).unwrap_err();
        assert!(matches!(err, crate::EngineError::Ingestion(_)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_non_finite_passes_through() {
        let mut estimator = SpeedEstimator::new(config());
        estimator.process(&record(0.0, f64::NAN, 0.0)).unwrap();
        let estimate = estimator.process(&record(1500.0, 0.0, 0.0)).unwrap().unwrap();
        assert!(!estimate.is_finite());
        assert!(estimate.distance_m.is_nan());
    }

    #[test]
    fn test_reset_allows_reprocessing() {
        let mut estimator = SpeedEstimator::new(config());
        let stream = || ok_stream(vec![record(0.0, 1.0, 1.0), record(1500.0, 0.01, 0.0)]);

        let mut first: Vec<SpeedEstimate> = Vec::new();
        estimator.run(stream(), &mut first).unwrap();

        estimator.reset();
        let mut second: Vec<SpeedEstimate> = Vec::new();
        estimator.run(stream(), &mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(estimator.estimate_count(), 1);
    }

    #[test]
    fn test_distribution_mode_falls_back() {
        let cfg = EstimatorConfig {
            summary_mode: SummaryMode::Distribution,
            ..config()
        };
        let estimator = SpeedEstimator::new(cfg);
        assert_eq!(estimator.summary_mode(), SummaryMode::Direct);
    }
}
