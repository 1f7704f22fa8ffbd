//! Great-circle and chord distances between GPS positions.
//!
//! Invalid coordinates are not rejected: a haversine term outside [0, 1]
//! yields NaN, which callers receive unchanged.

use contracts::{DistanceMode, WindowSummary};

/// Mean Earth radius (metres)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Surface distance between two lat/lon pairs (degrees), altitude ignored
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlat = phi2 - phi1;
    let dlon = lon2.to_radians() - lon1.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + (dlon / 2.0).sin().powi(2) * phi1.cos() * phi2.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Straight-line distance between two points lifted `alt` metres above the sphere
///
/// Law of cosines on the two radii; the radicand is clamped at zero to absorb
/// rounding when the points coincide.
pub fn chord_distance_3d_m(
    lat1: f64,
    lon1: f64,
    alt1: f64,
    lat2: f64,
    lon2: f64,
    alt2: f64,
) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = lon1.to_radians() - lon2.to_radians();

    let r1 = EARTH_RADIUS_M + alt1;
    let r2 = EARTH_RADIUS_M + alt2;
    let cos_angle = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * dlon.cos();

    let squared = r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * cos_angle;
    squared.max(0.0).sqrt()
}

/// Distance between two window summaries using the selected formula
pub fn distance_m(mode: DistanceMode, from: &WindowSummary, to: &WindowSummary) -> f64 {
    match mode {
        DistanceMode::Haversine => {
            haversine_distance_m(from.latitude, from.longitude, to.latitude, to.longitude)
        }
        DistanceMode::Chord3d => chord_distance_3d_m(
            from.latitude,
            from.longitude,
            from.altitude,
            to.latitude,
            to.longitude,
            to.altitude,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point_is_zero() {
        for (lat, lon) in [(0.0, 0.0), (51.5074, -0.1278), (-33.86, 151.21), (89.9, 179.9)] {
            assert_eq!(haversine_distance_m(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let there = haversine_distance_m(48.8566, 2.3522, 52.52, 13.405);
        let back = haversine_distance_m(52.52, 13.405, 48.8566, 2.3522);
        assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_one_degree_at_equator() {
        let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn test_haversine_paris_berlin() {
        let d = haversine_distance_m(48.8566, 2.3522, 52.52, 13.405);
        assert!((d - 877_500.0).abs() < 2_000.0, "got {d}");
    }

    #[test]
    fn test_haversine_antipodes_stay_finite() {
        let d = haversine_distance_m(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_haversine_invalid_latitude_propagates_nan_or_value() {
        // latitude drift far outside [-90, 90] must not panic
        let d = haversine_distance_m(400.0, 0.0, -400.0, 0.0);
        assert!(d.is_nan() || d >= 0.0);
    }

    #[test]
    fn test_chord_same_point_is_zero() {
        assert_eq!(chord_distance_3d_m(10.0, 20.0, 150.0, 10.0, 20.0, 150.0), 0.0);
        assert_eq!(chord_distance_3d_m(0.0, 0.0, 0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_chord_pure_altitude_change() {
        let d = chord_distance_3d_m(45.0, 7.0, 100.0, 45.0, 7.0, 250.0);
        assert!((d - 150.0).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn test_chord_close_to_haversine_for_short_hops() {
        let surface = haversine_distance_m(45.0, 7.0, 45.001, 7.001);
        let chord = chord_distance_3d_m(45.0, 7.0, 0.0, 45.001, 7.001, 0.0);
        assert!((surface - chord).abs() < 0.01, "{surface} vs {chord}");
    }

    #[test]
    fn test_distance_dispatch() {
        let from = WindowSummary {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
        };
        let to = WindowSummary {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 42.0,
        };
        assert_eq!(distance_m(DistanceMode::Haversine, &from, &to), 0.0);
        assert!((distance_m(DistanceMode::Chord3d, &from, &to) - 42.0).abs() < 1e-6);
    }
}
