// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Collaborator interfaces the search consumes.
//!
//! "Nothing matched" is never an error here: candidate lists may be empty and anchor
//! lookups return `Ok(None)`. `Err` is reserved for the data source itself failing.

use crate::geo::Position;
use crate::tour::Waypoint;
use thiserror::Error;

/// Upper bound on the candidates considered per extension.
pub const CANDIDATE_LIMIT: usize = 18;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Photo source has no photos")]
    Empty,
    #[error("Unknown source locator: {0}")]
    UnknownLocator(String),
}

pub trait PhotoSource {
    /// A random photo to seed a new attempt.
    fn fetch_random_photo(&mut self) -> Result<Waypoint, SourceError>;

    /// Photos near the one identified by `locator`, nearest first, at most
    /// [`CANDIDATE_LIMIT`] of them. Each call is a fresh request.
    fn fetch_candidates(&mut self, locator: &str) -> Result<Vec<Waypoint>, SourceError>;
}

pub trait AnchorResolver {
    /// An airport whose distance from `position` lies within `[min_nm, max_nm]`.
    fn find_nearby(
        &self,
        position: Position,
        min_nm: f64,
        max_nm: f64,
    ) -> Result<Option<Waypoint>, SourceError>;
}

impl<T: PhotoSource + ?Sized> PhotoSource for &mut T {
    fn fetch_random_photo(&mut self) -> Result<Waypoint, SourceError> {
        (**self).fetch_random_photo()
    }

    fn fetch_candidates(&mut self, locator: &str) -> Result<Vec<Waypoint>, SourceError> {
        (**self).fetch_candidates(locator)
    }
}

impl<T: AnchorResolver + ?Sized> AnchorResolver for &T {
    fn find_nearby(
        &self,
        position: Position,
        min_nm: f64,
        max_nm: f64,
    ) -> Result<Option<Waypoint>, SourceError> {
        (**self).find_nearby(position, min_nm, max_nm)
    }
}

impl<T: PhotoSource + ?Sized> PhotoSource for Box<T> {
    fn fetch_random_photo(&mut self) -> Result<Waypoint, SourceError> {
        (**self).fetch_random_photo()
    }

    fn fetch_candidates(&mut self, locator: &str) -> Result<Vec<Waypoint>, SourceError> {
        (**self).fetch_candidates(locator)
    }
}
