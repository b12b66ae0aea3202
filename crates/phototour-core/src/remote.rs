// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Photo source talking to a JSON photo service over HTTP.
//!
//! `GET {base}/photos/random` returns one record, and each record carries a
//! `nearby` URL that lists its neighbours nearest first. That URL is used as the
//! waypoint's source locator; records without one fall back to
//! `{base}/photos/{id}/nearby`.

use crate::source::{PhotoSource, SourceError, CANDIDATE_LIMIT};
use crate::tour::Waypoint;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
struct PhotoRecord {
    id: String,
    #[serde(default)]
    title: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    nearby: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyPage {
    photos: Vec<PhotoRecord>,
}

pub struct HttpPhotoSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpPhotoSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("phototour/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(classify)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn random_url(&self) -> String {
        format!("{}/photos/random", self.base_url)
    }

    fn nearby_url(&self, id: &str) -> String {
        format!("{}/photos/{}/nearby?limit={}", self.base_url, id, CANDIDATE_LIMIT)
    }

    fn to_waypoint(&self, record: PhotoRecord) -> Waypoint {
        let locator = record
            .nearby
            .clone()
            .unwrap_or_else(|| self.nearby_url(&record.id));
        let label = if record.title.is_empty() {
            record.id.clone()
        } else {
            record.title.clone()
        };
        Waypoint::photo(&record.id, &label, record.lat, record.lon, &locator)
    }

    fn get_text(&self, url: &str) -> Result<String, SourceError> {
        debug!("Fetching photo data — url={}", url);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        response.text().map_err(classify)
    }
}

impl PhotoSource for HttpPhotoSource {
    fn fetch_random_photo(&mut self) -> Result<Waypoint, SourceError> {
        let body = self.get_text(&self.random_url())?;
        let record = parse_record(&body)?;
        Ok(self.to_waypoint(record))
    }

    fn fetch_candidates(&mut self, locator: &str) -> Result<Vec<Waypoint>, SourceError> {
        let body = self.get_text(locator)?;
        let page = parse_page(&body)?;
        Ok(page
            .photos
            .into_iter()
            .take(CANDIDATE_LIMIT)
            .map(|r| self.to_waypoint(r))
            .collect())
    }
}

fn parse_record(body: &str) -> Result<PhotoRecord, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse(format!("photo record: {}", e)))
}

fn parse_page(body: &str) -> Result<NearbyPage, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse(format!("nearby page: {}", e)))
}

/// Timeouts are kept apart from other transport failures so callers can tell them
/// apart; the search treats both as fatal.
fn classify(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(e.to_string())
    } else if e.is_decode() {
        SourceError::Parse(e.to_string())
    } else {
        SourceError::Http(e.to_string())
    }
}
