// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::TourConfig;
use crate::geo;
use crate::source::{PhotoSource, SourceError, CANDIDATE_LIMIT};
use crate::tour::{Tour, Transition, Waypoint, WaypointKind};
use log::{debug, trace};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegConstraints {
    pub min_leg_dist_nm: f64,
    pub max_leg_dist_nm: f64,
    /// Exclusive upper bound on the absolute heading change at a waypoint.
    pub max_bearing_change: f64,
}

impl From<&TourConfig> for LegConstraints {
    fn from(config: &TourConfig) -> Self {
        Self {
            min_leg_dist_nm: config.min_leg_dist_nm,
            max_leg_dist_nm: config.max_leg_dist_nm,
            max_bearing_change: config.max_bearing_change,
        }
    }
}

impl LegConstraints {
    pub fn distance_ok(&self, distance_nm: f64) -> bool {
        distance_nm >= self.min_leg_dist_nm && distance_nm <= self.max_leg_dist_nm
    }
}

/// A candidate that passed every check, with the numbers it was judged on.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub waypoint: Waypoint,
    pub transition: Transition,
    pub heading_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    Accepted(Leg),
    /// No candidate fit. The branch ends here; this is not a failure.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NotAPhoto,
    TooClose(f64),
    TooFar(f64),
    TurnTooSharp(f64),
    AlreadyVisited,
}

#[derive(Error, Debug)]
pub enum ExtendError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Cannot extend a tour of {0} waypoint(s); at least two are required")]
    TourTooShort(usize),
    #[error("No inbound bearing at waypoint {0} to compare the next leg against")]
    MissingInboundBearing(String),
}

pub struct LegExtender {
    constraints: LegConstraints,
    candidate_limit: usize,
}

impl LegExtender {
    pub fn new(constraints: LegConstraints) -> Self {
        Self {
            constraints,
            candidate_limit: CANDIDATE_LIMIT,
        }
    }

    /// Picks the next waypoint for `tour`: the first photo candidate, in the order
    /// the source ranked them, that fits the distance window and turn limit and
    /// has not been visited.
    pub fn next<P: PhotoSource + ?Sized>(
        &self,
        photos: &mut P,
        tour: &Tour,
    ) -> Result<Extension, ExtendError> {
        let tail = match tour.waypoints() {
            [.., _, tail] => tail,
            short => return Err(ExtendError::TourTooShort(short.len())),
        };
        let inbound = tour
            .inbound_bearing()
            .ok_or_else(|| ExtendError::MissingInboundBearing(tail.id.clone()))?;

        let candidates = photos.fetch_candidates(&tail.source_locator)?;
        let offered = candidates.len();

        for candidate in candidates.into_iter().take(self.candidate_limit) {
            match self.evaluate(tour, tail, inbound, &candidate) {
                Ok((transition, heading_change)) => {
                    debug!(
                        "Accepted leg — from={} to={} distance_nm={:.2} bearing={:.1} turn={:.1}",
                        tail.id,
                        candidate.id,
                        transition.distance_nm,
                        transition.bearing,
                        heading_change
                    );
                    return Ok(Extension::Accepted(Leg {
                        waypoint: candidate,
                        transition,
                        heading_change,
                    }));
                }
                Err(reason) => {
                    trace!("Rejected candidate — id={} reason={:?}", candidate.id, reason);
                }
            }
        }

        debug!(
            "No acceptable candidate — tail={} offered={} limit={}",
            tail.id, offered, self.candidate_limit
        );
        Ok(Extension::Exhausted)
    }

    /// Judges a single candidate against the tail of `tour`.
    pub fn evaluate(
        &self,
        tour: &Tour,
        tail: &Waypoint,
        inbound_bearing: f64,
        candidate: &Waypoint,
    ) -> Result<(Transition, f64), Rejection> {
        if candidate.kind != WaypointKind::Photo {
            return Err(Rejection::NotAPhoto);
        }

        let transition = Transition::between(tail, candidate);
        let c = &self.constraints;

        let d = transition.distance_nm;
        if !c.distance_ok(d) {
            return Err(if d < c.min_leg_dist_nm {
                Rejection::TooClose(d)
            } else {
                Rejection::TooFar(d)
            });
        }

        let heading_change = geo::heading_delta(inbound_bearing, transition.bearing);
        if heading_change.abs() >= c.max_bearing_change {
            return Err(Rejection::TurnTooSharp(heading_change));
        }

        if tour.contains_id(&candidate.id) {
            return Err(Rejection::AlreadyVisited);
        }

        Ok((transition, heading_change))
    }
}
