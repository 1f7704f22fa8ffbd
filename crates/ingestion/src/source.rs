//! CSV row source
//!
//! Streams `GpsRecord`s out of the incremental GPS file. Each logical record
//! is one 11-field CSV line followed by the latitude, longitude and (altitude
//! mode only) altitude sample blocks. A block holds `samples_per_row` values,
//! separated by commas or line breaks, and always ends at a line boundary.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::{Axis, GpsIncrement, GpsRecord, SampleBlock, MAX_SAMPLES_PER_ROW};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::config::{IngestionMetrics, MetricsSnapshot, SourceConfig};
use crate::error::{IngestionError, Result};

/// Fields on every record line
pub const RECORD_FIELD_COUNT: usize = 11;

/// Record line as laid out in the file
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: i64,
    user_id: i64,
    timestamp_ms: f64,
    lat_increment: f64,
    lon_increment: f64,
    alt_increment: f64,
    speed: f64,
    bearing: f64,
    accuracy: f64,
    activity_id: i64,
    activity_label: String,
}

impl RawRecord {
    fn into_record(self, samples: SampleBlock) -> GpsRecord {
        GpsRecord {
            id: self.id,
            user_id: self.user_id,
            timestamp_ms: self.timestamp_ms,
            increment: GpsIncrement {
                latitude: self.lat_increment,
                longitude: self.lon_increment,
                altitude: self.alt_increment,
            },
            speed: self.speed,
            bearing: self.bearing,
            accuracy: self.accuracy,
            activity_id: self.activity_id,
            activity_label: self.activity_label,
            samples,
        }
    }
}

/// Streaming reader over the record file
pub struct CsvRowSource<R> {
    reader: R,
    config: SourceConfig,
    line: String,
    line_no: usize,
    header_skipped: bool,
    finished: bool,
    metrics: IngestionMetrics,
}

impl CsvRowSource<BufReader<File>> {
    /// Open a record file
    ///
    /// # Errors
    /// `IngestionError::Open` if the file cannot be opened.
    pub fn open(path: &Path, config: SourceConfig) -> Result<Self> {
        let file = File::open(path).map_err(|source| IngestionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "opened record file");
        Ok(Self::new(BufReader::new(file), config))
    }
}

impl<R: BufRead> CsvRowSource<R> {
    /// Wrap any buffered reader
    pub fn new(reader: R, config: SourceConfig) -> Self {
        Self {
            reader,
            config,
            line: String::new(),
            line_no: 0,
            header_skipped: false,
            finished: false,
            metrics: IngestionMetrics::new(),
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Physical line number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Read the next record with its sample blocks
    ///
    /// Returns `Ok(None)` at end of input.
    #[instrument(level = "trace", name = "csv_row_source_next", skip(self))]
    pub fn next_record(&mut self) -> Result<Option<GpsRecord>> {
        if !self.header_skipped {
            self.header_skipped = true;
            if !self.next_non_empty_line()? {
                return Ok(None);
            }
            trace!(header = %self.line.trim(), "skipped header line");
        }

        if !self.next_non_empty_line()? {
            return Ok(None);
        }

        let raw = parse_record_line(self.line.trim(), self.line_no)?;
        let samples = self.read_sample_block()?;
        let record = raw.into_record(samples);

        self.metrics.record_received(record.samples.value_count());
        trace!(
            id = record.id,
            timestamp_ms = record.timestamp_ms,
            "record parsed"
        );
        Ok(Some(record))
    }

    fn read_sample_block(&mut self) -> Result<SampleBlock> {
        let latitude = self.read_axis(Axis::Latitude)?;
        let longitude = self.read_axis(Axis::Longitude)?;
        let altitude = if self.config.altitude_mode {
            Some(self.read_axis(Axis::Altitude)?)
        } else {
            None
        };

        Ok(SampleBlock {
            latitude,
            longitude,
            altitude,
        })
    }

    /// Collect `samples_per_row` values for one axis
    fn read_axis(&mut self, axis: Axis) -> Result<Vec<f64>> {
        let expected = self.config.samples_per_row;
        let mut values = Vec::with_capacity(expected.min(MAX_SAMPLES_PER_ROW));

        while values.len() < expected {
            if !self.next_non_empty_line()? {
                return Err(IngestionError::Truncated {
                    line: self.line_no,
                    axis,
                    expected,
                    found: values.len(),
                });
            }

            for token in sample_tokens(&self.line) {
                if values.len() == expected {
                    return Err(IngestionError::parse(
                        self.line_no,
                        format!("{axis} sample block has more than {expected} values"),
                    ));
                }
                let value = token.parse::<f64>().map_err(|e| {
                    IngestionError::parse(
                        self.line_no,
                        format!("invalid {axis} sample '{token}': {e}"),
                    )
                })?;
                values.push(value);
            }
        }

        Ok(values)
    }

    /// Advance to the next line holding any content
    fn next_non_empty_line(&mut self) -> Result<bool> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            self.line_no += 1;
            self.metrics.record_line();
            if !self.line.trim().is_empty() {
                return Ok(true);
            }
        }
    }
}

impl<R: BufRead> Iterator for CsvRowSource<R> {
    type Item = Result<GpsRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                self.metrics.record_parse_error();
                Some(Err(e))
            }
        }
    }
}

fn sample_tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

fn parse_record_line(line: &str, line_no: usize) -> Result<RawRecord> {
    let malformed = |e: csv::Error| IngestionError::parse(line_no, format!("malformed record: {e}"));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let mut fields = csv::StringRecord::new();
    if !reader.read_record(&mut fields).map_err(malformed)? {
        return Err(IngestionError::parse(line_no, "empty record line"));
    }

    if fields.len() != RECORD_FIELD_COUNT {
        return Err(IngestionError::parse(
            line_no,
            format!(
                "expected {RECORD_FIELD_COUNT} record fields, found {}",
                fields.len()
            ),
        ));
    }

    fields.deserialize::<RawRecord>(None).map_err(malformed)
}
