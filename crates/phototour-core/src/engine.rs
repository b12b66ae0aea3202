// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Randomized tour search.
//!
//! Each attempt seeds from a random photo, hangs a start airport off it, extends
//! photo by photo until the source runs dry or `max_legs` is reached, then looks
//! for a closing airport. An attempt that falls short is thrown away whole and the
//! next one starts from a new seed; there is no backtracking. Source failures end
//! the search immediately.

use crate::config::TourConfig;
use crate::extender::{ExtendError, Extension, LegConstraints, LegExtender};
use crate::source::{AnchorResolver, PhotoSource, SourceError};
use crate::tour::{Tour, Transition, Waypoint, WaypointKind};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Shown to users when every attempt came up short.
pub const EXHAUSTED_HINT: &str = "Try relaxing the constraints: widen the leg distance window, allow a larger bearing change, or raise the number of attempts.";

/// Caller-owned stop flag, checked before every request the search makes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a single attempt was abandoned. These are expected and retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptFailure {
    #[error("no airport within range of seed photo {seed}")]
    NoStartAnchor { seed: String },
    #[error("ran out of candidates after {legs} leg(s), {min} required")]
    TooFewLegs { legs: usize, min: usize },
    #[error("no airport within range of final photo {tail}")]
    NoEndAnchor { tail: String },
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Data source failure on attempt {attempt}: {source}")]
    DataSource {
        attempt: u32,
        #[source]
        source: SourceError,
    },
    #[error("Search cancelled during attempt {attempt}")]
    Cancelled { attempt: u32 },
    #[error("Search defect on attempt {attempt}: {message}")]
    Logic { attempt: u32, message: String },
}

impl SearchError {
    pub fn attempt(&self) -> u32 {
        match self {
            SearchError::DataSource { attempt, .. }
            | SearchError::Cancelled { attempt }
            | SearchError::Logic { attempt, .. } => *attempt,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Discovery {
    Complete {
        tour: Tour,
        attempts: u32,
    },
    Exhausted {
        attempts: u32,
        failures: Vec<AttemptFailure>,
    },
}

impl Discovery {
    pub fn attempts(&self) -> u32 {
        match self {
            Discovery::Complete { attempts, .. } | Discovery::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn tour(&self) -> Option<&Tour> {
        match self {
            Discovery::Complete { tour, .. } => Some(tour),
            Discovery::Exhausted { .. } => None,
        }
    }

    pub fn into_tour(self) -> Option<Tour> {
        match self {
            Discovery::Complete { tour, .. } => Some(tour),
            Discovery::Exhausted { .. } => None,
        }
    }
}

enum AttemptOutcome {
    Complete(Tour),
    Failed(AttemptFailure),
}

pub struct TourSearchEngine<P, A> {
    config: TourConfig,
    extender: LegExtender,
    photos: P,
    anchors: A,
    cancel: CancelToken,
}

impl<P: PhotoSource, A: AnchorResolver> TourSearchEngine<P, A> {
    /// `config` is trusted as given; run [`TourConfig::validate`] first.
    pub fn new(config: TourConfig, photos: P, anchors: A) -> Self {
        let extender = LegExtender::new(LegConstraints::from(&config));
        Self {
            config,
            extender,
            photos,
            anchors,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn photo_source(&self) -> &P {
        &self.photos
    }

    pub fn anchor_resolver(&self) -> &A {
        &self.anchors
    }

    pub fn into_parts(self) -> (P, A) {
        (self.photos, self.anchors)
    }

    pub fn discover(&mut self) -> Result<Discovery, SearchError> {
        info!(
            "Starting tour search — max_attempts={} legs={}..={} leg_nm={}..={} max_turn={}",
            self.config.max_attempts,
            self.config.min_legs,
            self.config.max_legs,
            self.config.min_leg_dist_nm,
            self.config.max_leg_dist_nm,
            self.config.max_bearing_change
        );

        let mut failures = Vec::new();
        for attempt in 1..=self.config.max_attempts {
            match self.run_attempt(attempt) {
                Ok(AttemptOutcome::Complete(tour)) => {
                    info!(
                        "Tour discovered — attempt={} waypoints={} legs={} distance_nm={:.1}",
                        attempt,
                        tour.len(),
                        tour.legs(),
                        tour.total_distance_nm()
                    );
                    return Ok(Discovery::Complete {
                        tour,
                        attempts: attempt,
                    });
                }
                Ok(AttemptOutcome::Failed(reason)) => {
                    debug!("Attempt abandoned — attempt={} reason={}", attempt, reason);
                    failures.push(reason);
                }
                Err(e) => {
                    error!("Tour search aborted — {}", e);
                    return Err(e);
                }
            }
        }

        warn!(
            "Tour search exhausted — attempts={} min_legs={} max_legs={}",
            self.config.max_attempts, self.config.min_legs, self.config.max_legs
        );
        Ok(Discovery::Exhausted {
            attempts: self.config.max_attempts,
            failures,
        })
    }

    fn run_attempt(&mut self, attempt: u32) -> Result<AttemptOutcome, SearchError> {
        let min_nm = self.config.min_leg_dist_nm;
        let max_nm = self.config.max_leg_dist_nm;
        let fatal = |source: SourceError| SearchError::DataSource { attempt, source };

        self.checkpoint(attempt)?;
        let seed = expect_photo(self.photos.fetch_random_photo().map_err(fatal)?, attempt)?;
        debug!(
            "Seed photo — attempt={} id={} lat={:.5} lon={:.5}",
            attempt, seed.id, seed.lat, seed.lon
        );

        self.checkpoint(attempt)?;
        let anchor = match self
            .anchors
            .find_nearby(seed.position(), min_nm, max_nm)
            .map_err(fatal)?
        {
            Some(anchor) => expect_airport(anchor, attempt)?,
            None => {
                return Ok(AttemptOutcome::Failed(AttemptFailure::NoStartAnchor {
                    seed: seed.id,
                }))
            }
        };
        debug!("Start anchor — attempt={} id={}", attempt, anchor.id);

        let mut tour = Tour::begin(anchor, seed);
        let max_legs = self.config.max_legs as usize;

        while tour.legs() < max_legs {
            self.checkpoint(attempt)?;
            match self.extender.next(&mut self.photos, &tour) {
                Ok(Extension::Accepted(leg)) => tour.push(leg.waypoint, leg.transition),
                Ok(Extension::Exhausted) => break,
                Err(ExtendError::Source(source)) => return Err(fatal(source)),
                Err(e) => {
                    return Err(SearchError::Logic {
                        attempt,
                        message: e.to_string(),
                    })
                }
            }
        }

        let legs = tour.legs();
        let min_legs = self.config.min_legs as usize;
        if legs < min_legs {
            return Ok(AttemptOutcome::Failed(AttemptFailure::TooFewLegs {
                legs,
                min: min_legs,
            }));
        }

        let Some(tail) = tour.tail() else {
            return Err(SearchError::Logic {
                attempt,
                message: "tour lost its waypoints".to_string(),
            });
        };
        let tail_id = tail.id.clone();

        self.checkpoint(attempt)?;
        match self
            .anchors
            .find_nearby(tail.position(), min_nm, max_nm)
            .map_err(fatal)?
        {
            Some(end) => {
                let end = expect_airport(end, attempt)?;
                let transition = Transition::between(tail, &end);
                debug!("End anchor — attempt={} id={}", attempt, end.id);
                tour.push(end, transition);
                Ok(AttemptOutcome::Complete(tour))
            }
            None => Ok(AttemptOutcome::Failed(AttemptFailure::NoEndAnchor {
                tail: tail_id,
            })),
        }
    }

    fn checkpoint(&self, attempt: u32) -> Result<(), SearchError> {
        if self.cancel.is_cancelled() {
            info!("Tour search cancelled — attempt={}", attempt);
            return Err(SearchError::Cancelled { attempt });
        }
        Ok(())
    }
}

fn expect_airport(waypoint: Waypoint, attempt: u32) -> Result<Waypoint, SearchError> {
    if waypoint.kind != WaypointKind::Airport {
        return Err(SearchError::Logic {
            attempt,
            message: format!("anchor resolver returned non-airport waypoint {}", waypoint.id),
        });
    }
    Ok(waypoint)
}

fn expect_photo(waypoint: Waypoint, attempt: u32) -> Result<Waypoint, SearchError> {
    if waypoint.kind != WaypointKind::Photo {
        return Err(SearchError::Logic {
            attempt,
            message: format!("photo source returned non-photo seed {}", waypoint.id),
        });
    }
    Ok(waypoint)
}
