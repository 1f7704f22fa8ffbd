//! GpsRecord - Ingestion output
//!
//! Incremental GPS rows and their per-row particle samples.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Absolute GPS position
///
/// Reconstructed by summing the increments of every row read so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Altitude (metres)
    pub altitude: f64,
}

impl GpsFix {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

impl AddAssign<GpsIncrement> for GpsFix {
    fn add_assign(&mut self, inc: GpsIncrement) {
        self.latitude += inc.latitude;
        self.longitude += inc.longitude;
        self.altitude += inc.altitude;
    }
}

/// Position delta carried by one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsIncrement {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Coordinate axis of a sample block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Latitude,
    Longitude,
    Altitude,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
            Axis::Altitude => "altitude",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Particle offsets that accompany one row
///
/// Every value is an offset from the reconstructed base coordinate of the
/// row. `altitude` is only present when altitude mode is enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleBlock {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub altitude: Option<Vec<f64>>,
}

impl SampleBlock {
    /// Offsets for one axis
    pub fn axis(&self, axis: Axis) -> Option<&[f64]> {
        match axis {
            Axis::Latitude => Some(&self.latitude),
            Axis::Longitude => Some(&self.longitude),
            Axis::Altitude => self.altitude.as_deref(),
        }
    }

    /// Total number of sample values across all axes
    pub fn value_count(&self) -> usize {
        self.latitude.len()
            + self.longitude.len()
            + self.altitude.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// One logical record of the input file
///
/// The `speed` column is carried but never used for estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsRecord {
    pub id: i64,
    pub user_id: i64,

    /// Row timestamp (milliseconds) - main clock
    pub timestamp_ms: f64,

    pub increment: GpsIncrement,
    pub speed: f64,
    pub bearing: f64,
    pub accuracy: f64,
    pub activity_id: i64,
    pub activity_label: String,

    pub samples: SampleBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_accumulates_increments() {
        let mut fix = GpsFix::default();
        fix += GpsIncrement {
            latitude: 51.5,
            longitude: -0.1,
            altitude: 12.0,
        };
        fix += GpsIncrement {
            latitude: 0.25,
            longitude: 0.05,
            altitude: -2.0,
        };
        assert!((fix.latitude - 51.75).abs() < 1e-12);
        assert!((fix.longitude + 0.05).abs() < 1e-12);
        assert!((fix.altitude - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_block_axis_access() {
        let block = SampleBlock {
            latitude: vec![0.1, 0.2],
            longitude: vec![0.3, 0.4],
            altitude: None,
        };
        assert_eq!(block.axis(Axis::Longitude), Some(&[0.3, 0.4][..]));
        assert_eq!(block.axis(Axis::Altitude), None);
        assert_eq!(block.value_count(), 4);
    }
}
