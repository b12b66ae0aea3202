// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geo::{self, Position};
use crate::source::{AnchorResolver, SourceError};
use crate::tour::Waypoint;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirportType {
    Land,
    Seaplane,
    Heliport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub name: String,
    pub airport_type: AirportType,
    /// Mean of the runway and helipad coordinates.
    pub lat: f64,
    pub lon: f64,
}

impl Airport {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lon)
    }

    pub fn to_waypoint(&self) -> Waypoint {
        Waypoint::airport(&self.id, &self.name, self.lat, self.lon)
    }
}

#[derive(Error, Debug)]
pub enum AptDatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No apt.dat found under {}", .0.display())]
    NotFound(PathBuf),
}

pub struct AptDatParser;

impl AptDatParser {
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Airport>, AptDatError> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parses apt.dat text. Airports without any runway or helipad coordinates
    /// are dropped since they cannot anchor a tour.
    pub fn parse<R: BufRead>(mut reader: R) -> Result<Vec<Airport>, AptDatError> {
        let mut airports = Vec::with_capacity(1000);
        let mut line_buf = String::with_capacity(256);
        let mut current: Option<AirportBuilder> = None;

        loop {
            line_buf.clear();
            if reader.read_line(&mut line_buf)? == 0 {
                break;
            }

            let line = line_buf.trim();
            let Some(code) = line.split_whitespace().next() else {
                continue;
            };

            match code {
                "1" | "16" | "17" => {
                    if let Some(done) = current.take().and_then(AirportBuilder::build) {
                        airports.push(done);
                    }
                    let airport_type = match code {
                        "16" => AirportType::Seaplane,
                        "17" => AirportType::Heliport,
                        _ => AirportType::Land,
                    };
                    current = AirportBuilder::from_header(line, airport_type);
                }
                // Land runway: both ends. Water runway: both ends at a different offset.
                "100" => {
                    if let Some(ref mut b) = current {
                        b.push_coords(line, &[9, 18]);
                    }
                }
                "101" => {
                    if let Some(ref mut b) = current {
                        b.push_coords(line, &[4, 7]);
                    }
                }
                "102" => {
                    if let Some(ref mut b) = current {
                        b.push_coords(line, &[2]);
                    }
                }
                "99" => break,
                _ => {}
            }
        }

        if let Some(done) = current.take().and_then(AirportBuilder::build) {
            airports.push(done);
        }

        log::debug!("Parsed apt.dat — airports={}", airports.len());
        Ok(airports)
    }
}

struct AirportBuilder {
    id: String,
    name: String,
    airport_type: AirportType,
    lat_sum: f64,
    lon_sum: f64,
    count: u32,
}

impl AirportBuilder {
    // 0:code 1:elevation 2:deprecated 3:deprecated 4:ICAO 5..:name
    fn from_header(line: &str, airport_type: AirportType) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }
        Some(Self {
            id: parts[4].to_string(),
            name: parts[5..].join(" "),
            airport_type,
            lat_sum: 0.0,
            lon_sum: 0.0,
            count: 0,
        })
    }

    /// Reads the lat/lon pair that starts at each field index in `offsets`.
    fn push_coords(&mut self, line: &str, offsets: &[usize]) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        for &i in offsets {
            let (Some(lat_s), Some(lon_s)) = (parts.get(i), parts.get(i + 1)) else {
                continue;
            };
            if let (Ok(lat), Ok(lon)) = (lat_s.parse::<f64>(), lon_s.parse::<f64>()) {
                self.lat_sum += lat;
                self.lon_sum += lon;
                self.count += 1;
            }
        }
    }

    fn build(self) -> Option<Airport> {
        if self.count == 0 {
            return None;
        }
        Some(Airport {
            id: self.id,
            name: self.name,
            airport_type: self.airport_type,
            lat: self.lat_sum / self.count as f64,
            lon: self.lon_sum / self.count as f64,
        })
    }
}

/// Candidate apt.dat locations under an X-Plane root, newest layout first.
pub fn apt_dat_candidates(xplane_root: &Path) -> Vec<PathBuf> {
    vec![
        xplane_root
            .join("Global Scenery")
            .join("Global Airports")
            .join("Earth nav data")
            .join("apt.dat"),
        xplane_root
            .join("Resources")
            .join("default scenery")
            .join("default apt dat")
            .join("Earth nav data")
            .join("apt.dat"),
    ]
}

pub fn locate_apt_dat(xplane_root: &Path) -> Result<PathBuf, AptDatError> {
    apt_dat_candidates(xplane_root)
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| AptDatError::NotFound(xplane_root.to_path_buf()))
}

/// Airports that can anchor a tour, looked up by distance.
pub struct AirportIndex {
    airports: Vec<Airport>,
    allowed: Vec<AirportType>,
}

impl AirportIndex {
    /// Land airports only. Use [`AirportIndex::with_types`] to admit others.
    pub fn new(airports: Vec<Airport>) -> Self {
        Self::with_types(airports, vec![AirportType::Land])
    }

    pub fn with_types(airports: Vec<Airport>, allowed: Vec<AirportType>) -> Self {
        Self { airports, allowed }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AptDatError> {
        let path = path.as_ref();
        let airports = AptDatParser::parse_file(path)?;
        log::info!(
            "Loaded airport index — path={} airports={}",
            path.display(),
            airports.len()
        );
        Ok(Self::new(airports))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Airport> {
        self.airports.iter().find(|a| a.id.eq_ignore_ascii_case(id))
    }

    /// Closest allowed airport whose distance lies in `[min_nm, max_nm]`.
    /// Equal distances resolve by id so repeated lookups agree.
    pub fn nearest_within(&self, position: Position, min_nm: f64, max_nm: f64) -> Option<&Airport> {
        // One degree of latitude is ~60 nm; skip anything obviously out of reach
        let lat_reach = max_nm / 60.0 + 0.01;

        self.airports
            .iter()
            .filter(|a| self.allowed.contains(&a.airport_type))
            .filter(|a| (a.lat - position.lat).abs() <= lat_reach)
            .map(|a| (a, geo::distance_nm(position, a.position())))
            .filter(|(_, d)| *d >= min_nm && *d <= max_nm)
            .min_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)))
            .map(|(a, _)| a)
    }
}

impl AnchorResolver for AirportIndex {
    fn find_nearby(
        &self,
        position: Position,
        min_nm: f64,
        max_nm: f64,
    ) -> Result<Option<Waypoint>, SourceError> {
        Ok(self
            .nearest_within(position, min_nm, max_nm)
            .map(Airport::to_waypoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
I
1000 Version
1 433 0 0 KBOS General Edward Lawrence Logan Intl
100 60.96 1 2 0.25 1 3 0 09 42.35824967 -071.01833215 0 0 3 0 1 1 27 42.36533800 -070.99120668 0 0 3 0 1 1
16 0 0 0 W01 fake seaplane base
101 49 1 08 42.10000000 -071.10000000 26 42.12000000 -071.05000000
17 50 0 0 H123 fake heliport
102 H1 42.000000 -71.000000 0 0 0 0 0 0 0 0 0 0
1 10 0 0 XNOC no coordinates at all
99
";

    #[test]
    fn test_parse_airports() {
        let airports = AptDatParser::parse(Cursor::new(SAMPLE)).unwrap();

        // XNOC has no runways and is dropped
        assert_eq!(airports.len(), 3);

        let kbos = &airports[0];
        assert_eq!(kbos.id, "KBOS");
        assert_eq!(kbos.name, "General Edward Lawrence Logan Intl");
        assert_eq!(kbos.airport_type, AirportType::Land);
        assert!((kbos.lat - 42.3618).abs() < 0.001);
        assert!((kbos.lon - -71.0048).abs() < 0.001);

        let w01 = &airports[1];
        assert_eq!(w01.airport_type, AirportType::Seaplane);
        assert!((w01.lat - 42.11).abs() < 1e-6);

        let h123 = &airports[2];
        assert_eq!(h123.id, "H123");
        assert_eq!(h123.airport_type, AirportType::Heliport);
        assert_eq!(h123.lat, 42.0);
    }

    fn index() -> AirportIndex {
        AirportIndex::new(vec![
            Airport {
                id: "NEAR".into(),
                name: "Near Field".into(),
                airport_type: AirportType::Land,
                lat: 0.0,
                lon: 0.02,
            },
            Airport {
                id: "FAR".into(),
                name: "Far Field".into(),
                airport_type: AirportType::Land,
                lat: 0.0,
                lon: 0.1,
            },
            Airport {
                id: "HELI".into(),
                name: "Pad".into(),
                airport_type: AirportType::Heliport,
                lat: 0.0,
                lon: 0.03,
            },
        ])
    }

    #[test]
    fn test_nearest_within_window() {
        let idx = index();
        let origin = Position::new(0.0, 0.0);

        let hit = idx.find_nearby(origin, 0.5, 10.0).unwrap().unwrap();
        assert_eq!(hit.id, "NEAR");
        assert!(hit.is_airport());

        // NEAR is ~1.2 nm out; a 2 nm floor pushes the pick to FAR (~6 nm)
        let hit = idx.find_nearby(origin, 2.0, 10.0).unwrap().unwrap();
        assert_eq!(hit.id, "FAR");

        assert!(idx.find_nearby(origin, 7.0, 10.0).unwrap().is_none());
    }

    #[test]
    fn test_heliports_excluded_by_default() {
        let origin = Position::new(0.0, 0.0);
        // Only the heliport lies between 1.5 and 2 nm
        assert!(index().find_nearby(origin, 1.5, 2.0).unwrap().is_none());

        let all = AirportIndex::with_types(
            index().airports,
            vec![AirportType::Land, AirportType::Heliport],
        );
        assert_eq!(all.find_nearby(origin, 1.5, 2.0).unwrap().unwrap().id, "HELI");
    }

    #[test]
    fn test_locate_apt_dat() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locate_apt_dat(dir.path()).is_err());

        let xp11 = &apt_dat_candidates(dir.path())[1];
        std::fs::create_dir_all(xp11.parent().unwrap()).unwrap();
        std::fs::write(xp11, SAMPLE).unwrap();
        assert_eq!(&locate_apt_dat(dir.path()).unwrap(), xp11);

        let idx = AirportIndex::load(xp11).unwrap();
        assert_eq!(idx.len(), 3);
        assert!(idx.get("kbos").is_some());
    }
}
