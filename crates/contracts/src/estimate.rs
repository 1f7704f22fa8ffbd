//! SpeedEstimate - Speed engine output
//!
//! Window summaries and the speed estimate produced when a window closes.

use serde::{Deserialize, Serialize};

/// Distance formula used between window summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// Great-circle distance on the surface, altitude ignored
    #[default]
    Haversine,
    /// Straight chord between two points lifted by their altitude
    Chord3d,
}

impl DistanceMode {
    pub fn from_altitude_mode(altitude_mode: bool) -> Self {
        if altitude_mode {
            DistanceMode::Chord3d
        } else {
            DistanceMode::Haversine
        }
    }

    /// Label used in console output
    pub fn label(&self) -> &'static str {
        match self {
            DistanceMode::Haversine => "w/o altitude",
            DistanceMode::Chord3d => "with altitude",
        }
    }
}

/// Representative position of one window
///
/// In 2-axis mode `altitude` is the reconstructed fix altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Speed between two consecutive window boundaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedEstimate {
    /// Sequence number (monotonically increasing, from 0)
    pub window_index: u64,

    /// Summary at the window start (waypoint 1)
    pub start: WindowSummary,

    /// Summary at the closing row (waypoint 2)
    pub finish: WindowSummary,

    pub distance_m: f64,

    /// Closing timestamp minus window open timestamp
    pub elapsed_ms: f64,

    pub speed_m_per_ms: f64,

    pub closing_timestamp_ms: f64,

    pub distance_mode: DistanceMode,
}

impl SpeedEstimate {
    /// Speed converted to metres per second
    pub fn speed_m_per_s(&self) -> f64 {
        self.speed_m_per_ms * 1000.0
    }

    /// Whether distance and speed are finite numbers
    pub fn is_finite(&self) -> bool {
        self.distance_m.is_finite() && self.speed_m_per_ms.is_finite()
    }
}
