// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geo::{self, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointKind {
    Airport,
    Photo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub kind: WaypointKind,
    pub lat: f64,
    pub lon: f64,
    /// Opaque handle the photo source uses to look up candidates near this point.
    pub source_locator: String,
    pub forward_distance_nm: Option<f64>,
    pub forward_bearing: Option<f64>,
    pub label: String,
}

impl Waypoint {
    pub fn airport(id: &str, label: &str, lat: f64, lon: f64) -> Self {
        Self {
            id: id.to_string(),
            kind: WaypointKind::Airport,
            lat,
            lon,
            source_locator: String::new(),
            forward_distance_nm: None,
            forward_bearing: None,
            label: label.to_string(),
        }
    }

    pub fn photo(id: &str, label: &str, lat: f64, lon: f64, source_locator: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: WaypointKind::Photo,
            lat,
            lon,
            source_locator: source_locator.to_string(),
            forward_distance_nm: None,
            forward_bearing: None,
            label: label.to_string(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lon)
    }

    pub fn is_airport(&self) -> bool {
        self.kind == WaypointKind::Airport
    }
}

/// The transition from a tour's tail to the waypoint appended after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub distance_nm: f64,
    pub bearing: f64,
}

impl Transition {
    pub fn between(from: &Waypoint, to: &Waypoint) -> Self {
        Self {
            distance_nm: geo::distance_nm(from.position(), to.position()),
            bearing: geo::bearing(from.position(), to.position()),
        }
    }
}

/// An ordered chain of waypoints.
///
/// Tours only grow by appending, and only inside this crate. A tour handed back
/// from a search is read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    waypoints: Vec<Waypoint>,
}

impl Tour {
    /// Starts a tour at `anchor` heading to `seed`.
    ///
    /// The anchor's forward bearing is the reciprocal of the anchor-to-seed bearing,
    /// which is what the first heading-change check at the seed compares against.
    pub(crate) fn begin(mut anchor: Waypoint, seed: Waypoint) -> Self {
        let transition = Transition::between(&anchor, &seed);
        anchor.forward_distance_nm = Some(transition.distance_nm);
        anchor.forward_bearing = Some(geo::reciprocal(transition.bearing));
        Self {
            waypoints: vec![anchor, seed],
        }
    }

    /// Appends `next`, recording `transition` on the current tail.
    pub(crate) fn push(&mut self, next: Waypoint, transition: Transition) {
        if let Some(tail) = self.waypoints.last_mut() {
            debug_assert!(tail.forward_bearing.is_none(), "forward leg set twice");
            tail.forward_distance_nm = Some(transition.distance_nm);
            tail.forward_bearing = Some(transition.bearing);
        }
        self.waypoints.push(next);
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[cfg(test)]
    pub(crate) fn waypoints_mut_for_test(&mut self) -> &mut Vec<Waypoint> {
        &mut self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn tail(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Bearing of the leg arriving at the tail, if the tour has one.
    pub fn inbound_bearing(&self) -> Option<f64> {
        let n = self.waypoints.len();
        if n < 2 {
            return None;
        }
        self.waypoints[n - 2].forward_bearing
    }

    /// Number of photo-to-photo legs flown so far.
    pub fn legs(&self) -> usize {
        self.photo_count().saturating_sub(1)
    }

    pub fn photo_count(&self) -> usize {
        self.waypoints.iter().filter(|w| !w.is_airport()).count()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.waypoints.iter().any(|w| w.id == id)
    }

    pub fn total_distance_nm(&self) -> f64 {
        self.waypoints
            .iter()
            .filter_map(|w| w.forward_distance_nm)
            .sum()
    }

    /// The closing airport, when the tour has been completed.
    pub fn destination(&self) -> Option<&Waypoint> {
        match self.waypoints.last() {
            Some(w) if self.waypoints.len() > 2 && w.is_airport() => Some(w),
            _ => None,
        }
    }
}
