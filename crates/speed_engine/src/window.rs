//! Time-threshold window accumulation.
//!
//! Rows are folded into a cumulative fix. A window stays open until a row
//! arrives more than `threshold_ms` after the window start; that row's sample
//! block is summarized and becomes both the finish of the closing window and
//! the start of the next one.

use contracts::{Axis, ContractError, EstimatorConfig, GpsFix, GpsRecord, WindowSummary};
use tracing::instrument;

use crate::buffer::SampleBuffer;

/// Accumulator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// No row seen yet
    AwaitingFirstRow,
    /// A window is open and collecting rows
    WindowOpen,
    /// End of input reached, no further rows accepted
    StreamExhausted,
}

/// Boundary produced when a row closes the open window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTransition {
    pub start: WindowSummary,
    pub finish: WindowSummary,
    pub elapsed_ms: f64,
    pub closing_timestamp_ms: f64,
}

/// Sample buffers for the row that last opened or closed a window
#[derive(Debug)]
pub struct SampleWindow {
    latitude: SampleBuffer,
    longitude: SampleBuffer,
    altitude: Option<SampleBuffer>,
}

impl SampleWindow {
    pub fn new(samples_per_row: usize, altitude_mode: bool) -> Self {
        Self {
            latitude: SampleBuffer::for_row(Axis::Latitude, samples_per_row),
            longitude: SampleBuffer::for_row(Axis::Longitude, samples_per_row),
            altitude: altitude_mode.then(|| SampleBuffer::for_row(Axis::Altitude, samples_per_row)),
        }
    }

    /// Reload every buffer from `fix` and the record's sample offsets
    pub fn load(&mut self, fix: &GpsFix, record: &GpsRecord) -> Result<(), ContractError> {
        self.latitude
            .fill(fix.latitude, &record.samples.latitude)?;
        self.longitude
            .fill(fix.longitude, &record.samples.longitude)?;

        if let Some(buffer) = self.altitude.as_mut() {
            let offsets = record
                .samples
                .axis(Axis::Altitude)
                .ok_or_else(|| ContractError::sample_layout(Axis::Altitude.as_str(), "block missing"))?;
            buffer.fill(fix.altitude, offsets)?;
        }
        Ok(())
    }

    /// Mean of the first `count` samples per axis
    ///
    /// Without an altitude buffer the summary carries `fallback_altitude`.
    pub fn summarize(
        &self,
        count: usize,
        fallback_altitude: f64,
    ) -> Result<WindowSummary, ContractError> {
        let altitude = match &self.altitude {
            Some(buffer) => buffer.mean_of_first(count)?,
            None => fallback_altitude,
        };

        Ok(WindowSummary {
            latitude: self.latitude.mean_of_first(count)?,
            longitude: self.longitude.mean_of_first(count)?,
            altitude,
        })
    }

    pub fn buffered(&self, axis: Axis) -> usize {
        match axis {
            Axis::Latitude => self.latitude.len(),
            Axis::Longitude => self.longitude.len(),
            Axis::Altitude => self.altitude.as_ref().map_or(0, SampleBuffer::len),
        }
    }
}

/// Folds incremental rows into time-threshold windows
#[derive(Debug)]
pub struct SampleWindowAccumulator {
    samples_per_distribution: usize,
    threshold_ms: f64,
    state: AccumulatorState,
    fix: GpsFix,
    window: SampleWindow,
    window_start_ms: f64,
    start_summary: WindowSummary,
    /// Rows absorbed by the currently open window
    rows_in_window: u64,
    /// Rows absorbed across all windows
    rows_discarded: u64,
    rows_seen: u64,
}

impl SampleWindowAccumulator {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            samples_per_distribution: config.samples_per_distribution,
            threshold_ms: config.threshold_ms,
            state: AccumulatorState::AwaitingFirstRow,
            fix: GpsFix::default(),
            window: SampleWindow::new(config.samples_per_row, config.altitude_mode),
            window_start_ms: 0.0,
            start_summary: WindowSummary::default(),
            rows_in_window: 0,
            rows_discarded: 0,
            rows_seen: 0,
        }
    }

    /// Feed one row
    ///
    /// Returns a transition when the row closes the open window.
    ///
    /// # Errors
    /// `StreamExhausted` after [`finish`](Self::finish); buffer and summary
    /// errors from the row's sample block.
    #[instrument(
        level = "trace",
        name = "window_accumulator_push",
        skip(self, record),
        fields(record_id = record.id, timestamp_ms = record.timestamp_ms)
    )]
    pub fn push(&mut self, record: &GpsRecord) -> Result<Option<WindowTransition>, ContractError> {
        match self.state {
            AccumulatorState::StreamExhausted => Err(ContractError::StreamExhausted),
            AccumulatorState::AwaitingFirstRow => {
                self.rows_seen += 1;
                self.fix += record.increment;
                self.start_summary = self.load_and_summarize(record)?;
                self.window_start_ms = record.timestamp_ms;
                self.rows_in_window = 0;
                self.state = AccumulatorState::WindowOpen;

                tracing::debug!(
                    window_start_ms = self.window_start_ms,
                    latitude = self.start_summary.latitude,
                    longitude = self.start_summary.longitude,
                    "first window opened"
                );
                Ok(None)
            }
            AccumulatorState::WindowOpen => {
                self.rows_seen += 1;
                self.fix += record.increment;

                let elapsed_ms = record.timestamp_ms - self.window_start_ms;
                let closes = elapsed_ms > self.threshold_ms;
                if !closes {
                    self.rows_in_window += 1;
                    self.rows_discarded += 1;
                    return Ok(None);
                }

                let finish = self.load_and_summarize(record)?;
                let transition = WindowTransition {
                    start: self.start_summary,
                    finish,
                    elapsed_ms,
                    closing_timestamp_ms: record.timestamp_ms,
                };

                self.start_summary = finish;
                self.window_start_ms = record.timestamp_ms;
                self.rows_in_window = 0;
                Ok(Some(transition))
            }
        }
    }

    /// Summary of the row currently buffered
    pub fn summarize(&self) -> Result<WindowSummary, ContractError> {
        self.window
            .summarize(self.samples_per_distribution, self.fix.altitude)
    }

    /// Mark end of input
    ///
    /// The open window is dropped; returns how many rows it had absorbed.
    pub fn finish(&mut self) -> u64 {
        let dropped = match self.state {
            AccumulatorState::WindowOpen => self.rows_in_window,
            _ => 0,
        };
        self.state = AccumulatorState::StreamExhausted;
        self.rows_in_window = 0;
        dropped
    }

    fn load_and_summarize(&mut self, record: &GpsRecord) -> Result<WindowSummary, ContractError> {
        self.window.load(&self.fix, record)?;
        self.summarize()
    }

    #[inline]
    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Cumulative position reconstructed so far
    #[inline]
    pub fn fix(&self) -> GpsFix {
        self.fix
    }

    #[inline]
    pub fn window_start_ms(&self) -> f64 {
        self.window_start_ms
    }

    #[inline]
    pub fn rows_seen(&self) -> u64 {
        self.rows_seen
    }

    #[inline]
    pub fn rows_discarded(&self) -> u64 {
        self.rows_discarded
    }

    #[inline]
    pub fn rows_in_window(&self) -> u64 {
        self.rows_in_window
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }
}
