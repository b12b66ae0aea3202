// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Photo source backed by a local JSON catalog of geotagged photos.
//!
//! ```json
//! { "photos": [ { "id": "p1", "title": "Harbour", "lat": 47.6, "lon": -122.3 } ] }
//! ```

use crate::geo::{self, Position};
use crate::source::{PhotoSource, SourceError, CANDIDATE_LIMIT};
use crate::tour::Waypoint;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPhoto {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub lat: f64,
    pub lon: f64,
}

impl CatalogPhoto {
    fn position(&self) -> Position {
        Position::new(self.lat, self.lon)
    }

    fn to_waypoint(&self) -> Waypoint {
        let label = if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        };
        Waypoint::photo(&self.id, label, self.lat, self.lon, &self.id)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    photos: Vec<CatalogPhoto>,
}

pub struct PhotoCatalog {
    photos: Vec<CatalogPhoto>,
    rng: StdRng,
}

impl PhotoCatalog {
    pub fn new(photos: Vec<CatalogPhoto>) -> Self {
        Self::with_rng(photos, StdRng::from_entropy())
    }

    /// Reproducible seed selection, for tests and repeatable runs.
    pub fn with_seed(photos: Vec<CatalogPhoto>, seed: u64) -> Self {
        Self::with_rng(photos, StdRng::seed_from_u64(seed))
    }

    fn with_rng(photos: Vec<CatalogPhoto>, rng: StdRng) -> Self {
        let mut seen = HashSet::new();
        let total = photos.len();
        let photos: Vec<CatalogPhoto> = photos
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if photos.len() != total {
            warn!(
                "Dropped duplicate catalog ids — kept={} dropped={}",
                photos.len(),
                total - photos.len()
            );
        }
        Self { photos, rng }
    }

    pub fn from_json(content: &str) -> Result<Vec<CatalogPhoto>, SourceError> {
        let file: CatalogFile =
            serde_json::from_str(content).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(file.photos)
    }

    /// Reads a catalog file. With `seed` set, seed photo picks are reproducible.
    pub fn load<P: AsRef<Path>>(path: P, seed: Option<u64>) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let photos = Self::from_json(&content)?;
        debug!(
            "Loaded photo catalog — path={} photos={}",
            path.as_ref().display(),
            photos.len()
        );
        Ok(match seed {
            Some(seed) => Self::with_seed(photos, seed),
            None => Self::new(photos),
        })
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// The photos closest to `origin`, nearest first, excluding `origin` itself.
    fn nearest(&self, origin: &CatalogPhoto) -> Vec<Waypoint> {
        let from = origin.position();
        let mut ranked: Vec<(&CatalogPhoto, f64)> = self
            .photos
            .iter()
            .filter(|p| p.id != origin.id)
            .map(|p| (p, geo::distance_nm(from, p.position())))
            .collect();
        ranked.sort_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));
        ranked
            .into_iter()
            .take(CANDIDATE_LIMIT)
            .map(|(p, _)| p.to_waypoint())
            .collect()
    }
}

impl PhotoSource for PhotoCatalog {
    fn fetch_random_photo(&mut self) -> Result<Waypoint, SourceError> {
        self.photos
            .choose(&mut self.rng)
            .map(CatalogPhoto::to_waypoint)
            .ok_or(SourceError::Empty)
    }

    fn fetch_candidates(&mut self, locator: &str) -> Result<Vec<Waypoint>, SourceError> {
        let origin = self
            .photos
            .iter()
            .find(|p| p.id == locator)
            .ok_or_else(|| SourceError::UnknownLocator(locator.to_string()))?;
        Ok(self.nearest(origin))
    }
}
