use phototour_core::apt_dat::{Airport, AirportIndex, AirportType};
use phototour_core::catalog::{CatalogPhoto, PhotoCatalog};
use phototour_core::geo;
use phototour_core::{AttemptFailure, Discovery, Tour, TourConfig, TourSearchEngine, WaypointKind};
use std::collections::HashSet;

// --- Fixtures ---

/// 10 x 10 photos, 0.02 degrees (~1.2 nm) apart, just north of the equator.
fn photo_grid() -> Vec<CatalogPhoto> {
    let mut photos = Vec::new();
    for r in 0..10 {
        for c in 0..10 {
            photos.push(CatalogPhoto {
                id: format!("r{}c{}", r, c),
                title: format!("Grid photo {} {}", r, c),
                lat: r as f64 * 0.02,
                lon: c as f64 * 0.02,
            });
        }
    }
    photos
}

/// Airports offset from the photo lattice so none sits on top of a photo.
fn airport_grid() -> Vec<Airport> {
    let mut airports = Vec::new();
    for a in 0..4 {
        for b in 0..4 {
            airports.push(Airport {
                id: format!("X{}{}", a, b),
                name: format!("Grid Field {}{}", a, b),
                airport_type: AirportType::Land,
                lat: 0.01 + a as f64 * 0.06,
                lon: 0.01 + b as f64 * 0.06,
            });
        }
    }
    airports
}

fn grid_config() -> TourConfig {
    TourConfig {
        max_attempts: 60,
        min_legs: 2,
        max_legs: 5,
        min_leg_dist_nm: 0.5,
        max_leg_dist_nm: 5.0,
        max_bearing_change: 100.0,
    }
}

fn assert_tour_invariants(tour: &Tour, config: &TourConfig) {
    let w = tour.waypoints();
    let n = w.len();

    // Two airports, the seed photo and one photo per leg
    assert!(n >= config.min_legs as usize + 3, "tour too short: {}", n);
    assert!(n <= config.max_legs as usize + 3, "tour too long: {}", n);

    assert_eq!(w[0].kind, WaypointKind::Airport);
    assert_eq!(w[n - 1].kind, WaypointKind::Airport);
    assert!(w[1..n - 1].iter().all(|p| p.kind == WaypointKind::Photo));

    let mut ids = HashSet::new();
    for p in &w[..n - 1] {
        assert!(ids.insert(p.id.as_str()), "duplicate waypoint id {}", p.id);
    }

    for i in 0..n - 1 {
        let d = geo::distance_nm(w[i].position(), w[i + 1].position());
        assert!(
            d >= config.min_leg_dist_nm && d <= config.max_leg_dist_nm,
            "leg {} is {:.2} nm",
            i,
            d
        );
        let recorded = w[i].forward_distance_nm.expect("forward distance missing");
        assert!((recorded - d).abs() < 1e-9);
        assert!(w[i].forward_bearing.is_some());
    }
    assert!(w[n - 1].forward_bearing.is_none());
    assert!(w[n - 1].forward_distance_nm.is_none());

    // Every photo-to-photo leg turns less than the limit relative to the leg before it
    for i in 1..n - 2 {
        let inbound = w[i - 1].forward_bearing.unwrap();
        let outbound = geo::bearing(w[i].position(), w[i + 1].position());
        let turn = geo::heading_delta(inbound, outbound);
        assert!(
            turn.abs() < config.max_bearing_change,
            "turn of {:.1} at {}",
            turn,
            w[i].id
        );
    }
    for i in 2..n - 2 {
        let inbound = geo::bearing(w[i - 1].position(), w[i].position());
        let outbound = geo::bearing(w[i].position(), w[i + 1].position());
        assert!(geo::heading_delta(inbound, outbound).abs() < config.max_bearing_change);
    }
}

// --- Tests ---

#[test]
fn test_grid_tours_hold_invariants() {
    let config = grid_config();
    config.validate().unwrap();

    for seed in 0..12u64 {
        let photos = PhotoCatalog::with_seed(photo_grid(), seed);
        let anchors = AirportIndex::new(airport_grid());
        let mut engine = TourSearchEngine::new(config.clone(), photos, &anchors);

        match engine.discover().unwrap() {
            Discovery::Complete { tour, attempts } => {
                assert!(attempts >= 1 && attempts <= config.max_attempts);
                assert_tour_invariants(&tour, &config);
            }
            Discovery::Exhausted { failures, .. } => {
                panic!("seed {} found no tour: {:?}", seed, failures)
            }
        }
    }
}

#[test]
fn test_tight_turn_limit_still_holds_invariants() {
    let config = TourConfig {
        max_bearing_change: 50.0,
        min_legs: 1,
        ..grid_config()
    };

    let mut completed = 0;
    for seed in 0..12u64 {
        let photos = PhotoCatalog::with_seed(photo_grid(), seed);
        let anchors = AirportIndex::new(airport_grid());
        let mut engine = TourSearchEngine::new(config.clone(), photos, &anchors);

        if let Some(tour) = engine.discover().unwrap().into_tour() {
            assert_tour_invariants(&tour, &config);
            completed += 1;
        }
    }
    assert!(completed > 0);
}

#[test]
fn test_distant_airports_exhaust() {
    let config = TourConfig {
        max_attempts: 8,
        ..grid_config()
    };
    let photos = PhotoCatalog::with_seed(photo_grid(), 3);
    // Hundreds of miles from every photo, far outside the leg window
    let anchors = AirportIndex::new(vec![Airport {
        id: "LONE".into(),
        name: "Lone Field".into(),
        airport_type: AirportType::Land,
        lat: 5.0,
        lon: 5.0,
    }]);
    let mut engine = TourSearchEngine::new(config, photos, &anchors);

    match engine.discover().unwrap() {
        Discovery::Exhausted { attempts, failures } => {
            assert_eq!(attempts, 8);
            assert_eq!(failures.len(), 8);
            assert!(failures
                .iter()
                .all(|f| matches!(f, AttemptFailure::NoStartAnchor { .. })));
        }
        Discovery::Complete { .. } => panic!("No airport is within reach"),
    }
}
