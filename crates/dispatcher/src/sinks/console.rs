//! ConsoleSink - human-readable estimate report

use std::io::{self, Stdout, Write};

use contracts::{ContractError, DistanceMode, EstimateSink, SpeedEstimate};
use tracing::instrument;

/// Sink that prints each estimate as a block of text
///
/// Per estimate:
///
/// ```text
/// gpsStartLatDistr = 45.000000
/// gpsStartLonDistr = 7.000000
/// gpsFinishLatDistr = 45.001000
/// gpsFinishLonDistr = 7.000000
/// Position 0: Mean value of speed estimation(w/o altitude): 0.092662 deltaTimeStamp: 1200.000000
///
/// ```
///
/// Altitude lines are printed only for 3D chord estimates.
pub struct ConsoleSink<W: Write = Stdout> {
    name: String,
    writer: W,
}

impl ConsoleSink<Stdout> {
    /// Console sink on stdout
    pub fn stdout() -> Self {
        Self::new("console", io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_report(&mut self, estimate: &SpeedEstimate) -> io::Result<()> {
        let with_altitude = estimate.distance_mode == DistanceMode::Chord3d;
        let w = &mut self.writer;

        writeln!(w, "gpsStartLatDistr = {:.6}", estimate.start.latitude)?;
        writeln!(w, "gpsStartLonDistr = {:.6}", estimate.start.longitude)?;
        if with_altitude {
            writeln!(w, "gpsStartAltDistr = {:.6}", estimate.start.altitude)?;
        }

        writeln!(w, "gpsFinishLatDistr = {:.6}", estimate.finish.latitude)?;
        writeln!(w, "gpsFinishLonDistr = {:.6}", estimate.finish.longitude)?;
        if with_altitude {
            writeln!(w, "gpsFinishAltDistr = {:.6}", estimate.finish.altitude)?;
        }

        writeln!(
            w,
            "Position {}: Mean value of speed estimation({}): {:.6} deltaTimeStamp: {:.6}",
            estimate.window_index,
            estimate.distance_mode.label(),
            estimate.speed_m_per_ms,
            estimate.elapsed_ms
        )?;
        writeln!(w)
    }

    fn map_io(&self, err: io::Error) -> ContractError {
        ContractError::sink_write(&self.name, err.to_string())
    }
}

impl<W: Write> EstimateSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        level = "trace",
        name = "console_sink_write",
        skip(self, estimate),
        fields(sink = %self.name, window_index = estimate.window_index)
    )]
    fn write(&mut self, estimate: &SpeedEstimate) -> Result<(), ContractError> {
        self.write_report(estimate).map_err(|e| self.map_io(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush().map_err(|e| self.map_io(e))
    }

    fn close(&mut self) -> Result<(), ContractError> {
        self.flush()
    }
}
