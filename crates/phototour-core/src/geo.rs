// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Great-circle helpers. Distances are nautical miles, angles are degrees.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.06;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Haversine distance between two points in nautical miles.
pub fn distance_nm(from: Position, to: Position) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_NM * c
}

/// Initial true bearing from `from` to `to`, normalized to `[0, 360)`.
pub fn bearing(from: Position, to: Position) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    normalize(y.atan2(x).to_degrees())
}

/// Signed minimal turn from heading `from` to heading `to`, in `(-180, 180]`.
/// Positive values turn right (clockwise).
pub fn heading_delta(from: f64, to: f64) -> f64 {
    let delta = normalize(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

pub fn reciprocal(bearing: f64) -> f64 {
    normalize(bearing + 180.0)
}

fn normalize(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_equator_degree() {
        // One degree of longitude on the equator is 60 nm (give or take the radius used)
        let d = distance_nm(Position::new(0.0, 0.0), Position::new(0.0, 1.0));
        assert!((d - 60.04).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_distance_kbos_kjfk() {
        let kbos = Position::new(42.3656, -71.0096);
        let kjfk = Position::new(40.6413, -73.7781);
        let d = distance_nm(kbos, kjfk);
        assert!(d > 160.0 && d < 165.0, "got {}", d);
        assert!((distance_nm(kjfk, kbos) - d).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_cardinals() {
        let origin = Position::new(0.0, 0.0);
        assert!((bearing(origin, Position::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(origin, Position::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, Position::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(origin, Position::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_range() {
        let b = bearing(Position::new(40.7128, -74.0060), Position::new(34.0522, -118.2437));
        assert!((0.0..360.0).contains(&b));
        assert!(b > 200.0 && b < 280.0, "New York to Los Angeles should be WSW, got {}", b);
    }

    #[test]
    fn test_heading_delta_wraps() {
        assert_eq!(heading_delta(350.0, 10.0), 20.0);
        assert_eq!(heading_delta(10.0, 350.0), -20.0);
        assert_eq!(heading_delta(90.0, 90.0), 0.0);
        // Exactly opposite resolves to +180, never -180
        assert_eq!(heading_delta(0.0, 180.0), 180.0);
        assert_eq!(heading_delta(180.0, 0.0), 180.0);
        assert_eq!(heading_delta(270.0, 90.0), 180.0);
    }

    #[test]
    fn test_reciprocal() {
        assert_eq!(reciprocal(0.0), 180.0);
        assert_eq!(reciprocal(90.0), 270.0);
        assert_eq!(reciprocal(270.0), 90.0);
        assert_eq!(reciprocal(359.0), 179.0);
        assert_eq!(reciprocal(180.0), 0.0);
    }
}
