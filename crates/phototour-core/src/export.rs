// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::TourConfig;
use crate::tour::{Tour, WaypointKind};
use serde::Serialize;
use std::fmt::Write;

/// Default cruise altitude written for photo fixes, feet MSL.
pub const DEFAULT_TOUR_ALTITUDE_FT: u32 = 1500;

#[derive(Debug, Serialize)]
pub struct TourDocument<'a> {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub attempts: u32,
    pub total_distance_nm: f64,
    pub config: &'a TourConfig,
    pub tour: &'a Tour,
}

pub fn export_json(tour: &Tour, config: &TourConfig, attempts: u32) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&TourDocument {
        generated_at: chrono::Utc::now(),
        attempts,
        total_distance_nm: tour.total_distance_nm(),
        config,
        tour,
    })
}

/// X-Plane 11/12 `.fms` (version 1100). Airports are written as type 1 entries,
/// photo locations as type 28 lat/lon fixes named `PH01`, `PH02`, ...
pub fn export_fms(tour: &Tour, altitude_ft: u32) -> String {
    let waypoints = tour.waypoints();
    let origin = waypoints.first().map(|w| w.id.as_str()).unwrap_or_default();
    let dest = waypoints.last().map(|w| w.id.as_str()).unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "I");
    let _ = writeln!(out, "1100 Version");
    let _ = writeln!(out, "CYCLE 1709");
    let _ = writeln!(out, "ADEP {}", origin);
    let _ = writeln!(out, "ADES {}", dest);
    let _ = writeln!(out, "NUMENR {}", waypoints.len());

    let last = waypoints.len().saturating_sub(1);
    let mut photo_no = 0;
    for (i, w) in waypoints.iter().enumerate() {
        match w.kind {
            WaypointKind::Airport => {
                let via = if i == 0 {
                    "ADEP"
                } else if i == last {
                    "ADES"
                } else {
                    "DRCT"
                };
                let _ = writeln!(
                    out,
                    "1 {} {} 0.000000 {:.6} {:.6}",
                    w.id, via, w.lat, w.lon
                );
            }
            WaypointKind::Photo => {
                photo_no += 1;
                let _ = writeln!(
                    out,
                    "28 PH{:02} DRCT {:.6} {:.6} {:.6}",
                    photo_no, altitude_ft as f64, w.lat, w.lon
                );
            }
        }
    }
    out
}

/// Human-readable leg table.
pub fn summary(tour: &Tour) -> String {
    let mut out = String::new();
    let waypoints = tour.waypoints();
    let origin = waypoints.first().map(|w| w.id.as_str()).unwrap_or("?");
    let dest = waypoints.last().map(|w| w.id.as_str()).unwrap_or("?");

    let _ = writeln!(
        out,
        "Photo tour {} -> {}: {} photos, {} legs, {:.1} nm",
        origin,
        dest,
        tour.photo_count(),
        tour.legs(),
        tour.total_distance_nm()
    );
    let _ = writeln!(
        out,
        "{:>3}  {:<7}  {:<12}  {:>10}  {:>11}  {:>7}  {:>5}  Label",
        "#", "Kind", "Id", "Lat", "Lon", "Leg nm", "Hdg"
    );
    for (i, w) in waypoints.iter().enumerate() {
        let kind = match w.kind {
            WaypointKind::Airport => "Airport",
            WaypointKind::Photo => "Photo",
        };
        let leg = w
            .forward_distance_nm
            .map(|d| format!("{:.1}", d))
            .unwrap_or_else(|| "-".to_string());
        let hdg = w
            .forward_bearing
            .map(|b| format!("{:03.0}", b))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>3}  {:<7}  {:<12}  {:>10.5}  {:>11.5}  {:>7}  {:>5}  {}",
            i + 1,
            kind,
            w.id,
            w.lat,
            w.lon,
            leg,
            hdg,
            w.label
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tour::{Transition, Waypoint};

    fn sample_tour() -> Tour {
        let anchor = Waypoint::airport("KAAA", "Alpha Field", 0.0, 0.01);
        let mut tour = Tour::begin(
            anchor.clone(),
            Waypoint::photo("p1", "Pier", 0.0, 0.0, "p1"),
        );
        let p2 = Waypoint::photo("p2", "Tower", 0.0, 0.02, "p2");
        let t = Transition::between(&tour.waypoints()[1], &p2);
        tour.push(p2, t);
        let t = Transition::between(&tour.waypoints()[2], &anchor);
        tour.push(anchor, t);
        tour
    }

    #[test]
    fn test_export_fms() {
        let fms = export_fms(&sample_tour(), DEFAULT_TOUR_ALTITUDE_FT);
        let lines: Vec<&str> = fms.lines().collect();

        assert_eq!(lines[0], "I");
        assert_eq!(lines[1], "1100 Version");
        assert_eq!(lines[3], "ADEP KAAA");
        assert_eq!(lines[4], "ADES KAAA");
        assert_eq!(lines[5], "NUMENR 4");
        assert!(lines[6].starts_with("1 KAAA ADEP "));
        assert!(lines[7].starts_with("28 PH01 DRCT 1500.000000 "));
        assert!(lines[8].starts_with("28 PH02 DRCT "));
        assert!(lines[9].starts_with("1 KAAA ADES "));
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn test_summary_lists_every_waypoint() {
        let text = summary(&sample_tour());
        assert!(text.starts_with("Photo tour KAAA -> KAAA: 2 photos, 1 legs"));
        assert!(text.contains("Pier"));
        assert!(text.contains("Tower"));
        // header + column titles + 4 rows
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn test_export_json_round_trips_tour() {
        let tour = sample_tour();
        let json = export_json(&tour, &TourConfig::default(), 3).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["attempts"], 3);
        assert!(value["generated_at"].is_string());
        let parsed: Tour = serde_json::from_value(value["tour"].clone()).unwrap();
        assert_eq!(parsed, tour);
    }
}
