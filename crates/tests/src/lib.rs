//! # Integration Tests
//!
//! End-to-end flows across crates:
//! - record file -> CsvRowSource -> SpeedEstimator -> sinks
//! - settings file -> ConfigLoader -> estimator configuration

#[cfg(test)]
mod fixtures {
    use std::fmt::Write as _;
    use std::io::Write;

    use tempfile::NamedTempFile;

    pub const HEADER: &str =
        "id,userId,timestampMs,latIncrement,lonIncrement,altIncrement,speed,bearing,accuracy,activityId,activityLabel";

    /// One row: timestamp, increments, and a constant offset per sample block
    pub struct Row {
        pub timestamp_ms: f64,
        pub increment: (f64, f64, f64),
        pub offset: f64,
    }

    pub fn row(timestamp_ms: f64, dlat: f64, dlon: f64) -> Row {
        Row {
            timestamp_ms,
            increment: (dlat, dlon, 0.0),
            offset: 0.0,
        }
    }

    /// Render rows in the comma-per-block layout
    pub fn render(rows: &[Row], samples_per_row: usize, altitude_mode: bool) -> String {
        let mut text = String::new();
        writeln!(text, "{HEADER}").unwrap();
        for (i, r) in rows.iter().enumerate() {
            writeln!(
                text,
                "{},1,{},{},{},{},0,0,5,1,driving",
                i + 1,
                r.timestamp_ms,
                r.increment.0,
                r.increment.1,
                r.increment.2
            )
            .unwrap();

            let blocks = if altitude_mode { 3 } else { 2 };
            let block = vec![r.offset.to_string(); samples_per_row].join(",");
            for _ in 0..blocks {
                writeln!(text, "{block}").unwrap();
            }
        }
        text
    }

    pub fn write_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{DistanceMode, EstimatorConfig, SpeedEstimate};
    use dispatcher::{ConsoleSink, Dispatcher, LogSink};
    use ingestion::{CsvRowSource, IngestionError, SourceConfig};
    use speed_engine::{chord_distance_3d_m, haversine_distance_m, EngineError, SpeedEstimator};

    use crate::fixtures::{render, row, write_file, Row};

    fn config(samples_per_row: usize) -> EstimatorConfig {
        EstimatorConfig {
            samples_per_distribution: samples_per_row,
            samples_per_row,
            threshold_ms: 1000.0,
            ..Default::default()
        }
    }

    fn run_file(
        text: &str,
        config: EstimatorConfig,
    ) -> (Result<speed_engine::RunStats, EngineError>, Vec<SpeedEstimate>) {
        let file = write_file(text);
        let source = CsvRowSource::open(file.path(), SourceConfig::from(&config)).unwrap();
        let mut estimator = SpeedEstimator::new(config);
        let mut estimates = Vec::new();
        let result = estimator.run(source, &mut estimates);
        (result, estimates)
    }

    /// Two records 1200 ms apart give a single haversine estimate
    #[test]
    fn test_e2e_two_records_one_estimate() {
        let text = render(&[row(0.0, 45.0, 7.0), row(1200.0, 0.01, 0.0)], 4, false);
        let (result, estimates) = run_file(&text, config(4));

        let stats = result.unwrap();
        assert_eq!(stats.records_read, 2);
        assert_eq!(stats.estimates_emitted, 1);
        assert_eq!(estimates.len(), 1);

        let estimate = &estimates[0];
        let expected = haversine_distance_m(45.0, 7.0, 45.0 + 0.01, 7.0);
        assert_eq!(estimate.elapsed_ms, 1200.0);
        assert_eq!(estimate.distance_mode, DistanceMode::Haversine);
        assert!((estimate.distance_m - expected).abs() < 1e-6);
        assert!((estimate.speed_m_per_ms - expected / 1200.0).abs() < 1e-9);
    }

    /// Rows after the last boundary never produce an estimate
    #[test]
    fn test_e2e_trailing_window_dropped() {
        let rows = [
            row(0.0, 10.0, 10.0),
            row(1500.0, 0.001, 0.0),
            row(2000.0, 0.001, 0.0),
            row(2400.0, 0.001, 0.0),
        ];
        let (result, estimates) = run_file(&render(&rows, 2, false), config(2));

        let stats = result.unwrap();
        assert_eq!(estimates.len(), 1);
        assert_eq!(stats.trailing_rows_dropped, 2);
        assert_eq!(stats.rows_discarded, 2);
    }

    /// Chained windows share boundaries
    #[test]
    fn test_e2e_consecutive_windows() {
        let rows: Vec<Row> = (0..5).map(|i| row(i as f64 * 1001.0, 0.0001, 0.0)).collect();
        let (result, estimates) = run_file(&render(&rows, 2, false), config(2));

        assert_eq!(result.unwrap().estimates_emitted, 4);
        for pair in estimates.windows(2) {
            assert_eq!(pair[1].start, pair[0].finish);
            assert_eq!(pair[1].window_index, pair[0].window_index + 1);
        }
        assert!(estimates.iter().all(|e| e.elapsed_ms == 1001.0));
    }

    #[test]
    fn test_e2e_max_estimates() {
        let rows: Vec<Row> = (0..10).map(|i| row(i as f64 * 1100.0, 0.001, 0.0)).collect();
        let config = EstimatorConfig {
            max_estimates: Some(3),
            ..config(2)
        };
        let (result, estimates) = run_file(&render(&rows, 2, false), config);

        let stats = result.unwrap();
        assert!(stats.stopped_early);
        assert_eq!(estimates.len(), 3);
        assert_eq!(stats.records_read, 4);
    }

    #[test]
    fn test_e2e_altitude_mode_chord() {
        let rows = [
            Row {
                timestamp_ms: 0.0,
                increment: (45.0, 7.0, 200.0),
                offset: 0.0,
            },
            Row {
                timestamp_ms: 2000.0,
                increment: (0.0, 0.0, 30.0),
                offset: 0.0,
            },
        ];
        let config = EstimatorConfig {
            altitude_mode: true,
            ..config(3)
        };
        let (result, estimates) = run_file(&render(&rows, 3, true), config);

        result.unwrap();
        let estimate = &estimates[0];
        let expected = chord_distance_3d_m(45.0, 7.0, 200.0, 45.0, 7.0, 230.0);
        assert_eq!(estimate.distance_mode, DistanceMode::Chord3d);
        assert!((estimate.distance_m - expected).abs() < 1e-6);
        assert!((estimate.finish.altitude - 230.0).abs() < 1e-9);
    }

    /// The summary is the mean of the first samples, base value included
    #[test]
    fn test_e2e_sample_offsets_move_summary() {
        let rows = [
            Row {
                timestamp_ms: 0.0,
                increment: (10.0, 20.0, 0.0),
                offset: 0.5,
            },
            Row {
                timestamp_ms: 1001.0,
                increment: (0.0, 0.0, 0.0),
                offset: 0.0,
            },
        ];
        let config = EstimatorConfig {
            samples_per_distribution: 2,
            samples_per_row: 2,
            ..config(2)
        };
        let (result, estimates) = run_file(&render(&rows, 2, false), config);

        result.unwrap();
        // buffer [10, 10.5, 10.5] -> mean of first two
        assert!((estimates[0].start.latitude - 10.25).abs() < 1e-12);
        assert!((estimates[0].finish.latitude - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_e2e_parse_error_aborts() {
        let mut text = render(&[row(0.0, 1.0, 1.0), row(1500.0, 0.0, 0.0)], 2, false);
        text.push_str("3,1,oops,0,0,0,0,0,5,1,driving\n0,0\n0,0\n");
        let tail = render(&[row(3000.0, 0.0, 0.0)], 2, false);
        for line in tail.lines().skip(1) {
            text.push_str(line);
            text.push('\n');
        }

        let (result, estimates) = run_file(&text, config(2));
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Ingestion(IngestionError::Parse { .. })
        ));
        // estimate before the bad line was already delivered
        assert_eq!(estimates.len(), 1);
    }

    #[test]
    fn test_e2e_truncated_block_aborts() {
        let mut text = render(&[row(0.0, 1.0, 1.0)], 2, false);
        text.push_str("2,1,1500,0,0,0,0,0,5,1,driving\n0,0\n");

        let (result, estimates) = run_file(&text, config(2));
        assert!(matches!(
            result.unwrap_err(),
            EngineError::Ingestion(IngestionError::Truncated { .. })
        ));
        assert!(estimates.is_empty());
    }

    #[test]
    fn test_e2e_dispatcher_console_and_log() {
        let text = render(
            &[row(0.0, 45.0, 7.0), row(1200.0, 0.001, 0.0), row(2400.0, 0.001, 0.0)],
            2,
            false,
        );
        let file = write_file(&text);
        let config = config(2);
        let source = CsvRowSource::open(file.path(), SourceConfig::from(&config)).unwrap();

        let mut dispatcher = Dispatcher::with_sinks(vec![
            Box::new(ConsoleSink::new("console", Vec::new())),
            Box::new(LogSink::new("log")),
        ]);
        let mut estimator = SpeedEstimator::new(config);
        let stats = estimator.run(source, &mut dispatcher).unwrap();
        dispatcher.shutdown().unwrap();

        assert_eq!(stats.estimates_emitted, 2);
        assert_eq!(dispatcher.dispatched(), 2);
        for (_, metrics) in dispatcher.metrics() {
            assert_eq!(metrics.write_count, 2);
            assert_eq!(metrics.failure_count, 0);
        }
    }

    #[test]
    fn test_e2e_console_output_format() {
        let text = render(&[row(0.0, 45.0, 7.0), row(1200.0, 0.0, 0.0)], 2, false);
        let file = write_file(&text);
        let config = config(2);
        let source = CsvRowSource::open(file.path(), SourceConfig::from(&config)).unwrap();

        let mut console = ConsoleSink::new("console", Vec::new());
        SpeedEstimator::new(config).run(source, &mut console).unwrap();

        let output = String::from_utf8(console.into_inner()).unwrap();
        assert!(output.starts_with("gpsStartLatDistr = 45.000000\n"));
        assert!(output.contains(
            "Position 0: Mean value of speed estimation(w/o altitude): 0.000000 deltaTimeStamp: 1200.000000\n"
        ));
    }

    #[test]
    fn test_e2e_open_missing_file() {
        let err = CsvRowSource::open(
            std::path::Path::new("/nonexistent/records.csv"),
            SourceConfig::default(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().starts_with("error opening /nonexistent/records.csv"));
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use config_loader::ConfigLoader;
    use contracts::{SinkKind, DEFAULT_INPUT_FILE};
    use speed_engine::SpeedEstimator;

    #[test]
    fn test_settings_file_drives_estimator() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "estimator": {{
                    "samples_per_distribution": 8,
                    "samples_per_row": 16,
                    "altitude_mode": true
                }},
                "output": {{ "sinks": ["console", "log"] }}
            }}"#
        )
        .unwrap();

        let settings = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(settings.input_path().to_str(), Some(DEFAULT_INPUT_FILE));
        assert_eq!(settings.output.sinks, vec![SinkKind::Console, SinkKind::Log]);

        let estimator = SpeedEstimator::new(settings.estimator);
        assert_eq!(estimator.distance_mode(), contracts::DistanceMode::Chord3d);
        assert_eq!(estimator.config().samples_per_row, 16);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let toml = "[estimator]\nsamples_per_distribution = 0\n";
        assert!(ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml).is_err());
    }
}
