use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use carpool_map::diagnostics::{ABORT_LINE, Severity};
use carpool_map::enrich::{EnrichSummary, Enricher, GeocodeCandidate, Geocoder};
use carpool_map::io::fixture::FixtureGeocoder;
use carpool_map::model::{Bounds, LatLng, Location, Marker};
use carpool_map::{MapError, Result, parse};
use tokio::sync::Barrier;

fn candidate(lat: f64, lng: f64, span: Option<f64>, label: &str) -> GeocodeCandidate {
    GeocodeCandidate {
        center: LatLng::new(lat, lng),
        bounds: span.map(|span| {
            Bounds::new(
                LatLng::new(lat - span, lng - span),
                LatLng::new(lat + span, lng + span),
            )
        }),
        label: label.to_string(),
    }
}

fn locations(names: &[&str]) -> Vec<Location> {
    names
        .iter()
        .enumerate()
        .map(|(row, name)| Location::new(row, *name))
        .collect()
}

fn fixture() -> FixtureGeocoder {
    FixtureGeocoder::new()
        .with(
            "123 Main St",
            vec![
                candidate(47.6062, -122.3321, Some(0.0002), "123 Main St, Seattle"),
                candidate(10.0, 10.0, None, "somewhere else"),
            ],
        )
        .with(
            "Springfield",
            vec![candidate(39.7817, -89.6501, Some(0.1), "Springfield, Illinois")],
        )
        .with("9 Oak Ave", vec![candidate(47.61, -122.33, None, "9 Oak Ave")])
}

#[tokio::test]
async fn resolves_every_location_from_first_candidate() {
    let mut places = locations(&["123 Main St", "9 Oak Ave"]);
    let mut log: Vec<String> = Vec::new();

    let summary = Enricher::new(fixture()).enrich(&mut places, &mut log).await;

    assert_eq!(
        summary,
        EnrichSummary {
            resolved: 2,
            failed: 0,
            flagged: 0,
        }
    );
    assert_eq!(places[0].coordinates, Some(LatLng::new(47.6062, -122.3321)));
    assert_eq!(places[1].coordinates, Some(LatLng::new(47.61, -122.33)));
    assert!(places.iter().all(|place| place.error.is_none()));
    assert!(log.is_empty());
}

#[tokio::test]
async fn oversized_match_is_flagged_but_accepted() {
    let mut places = locations(&["Springfield"]);
    let mut log: Vec<String> = Vec::new();

    let summary = Enricher::new(fixture()).enrich(&mut places, &mut log).await;

    assert_eq!(summary.flagged, 1);
    assert_eq!(summary.resolved, 1);
    assert_eq!(places[0].coordinates, Some(LatLng::new(39.7817, -89.6501)));
    assert_eq!(log.len(), 1);
    assert_eq!(Severity::of(&log[0]), Severity::Warning);
    assert!(log[0].contains("'Springfield'"));
    assert!(log[0].contains("Springfield, Illinois"));
}

#[tokio::test]
async fn threshold_can_be_raised() {
    let mut places = locations(&["Springfield"]);
    let mut log: Vec<String> = Vec::new();

    let enricher = Enricher::new(fixture()).with_area_threshold(f64::INFINITY);
    let summary = enricher.enrich(&mut places, &mut log).await;

    assert_eq!(summary.flagged, 0);
    assert!(log.is_empty());
}

#[tokio::test]
async fn empty_result_is_recorded_on_that_location_only() {
    let mut places = locations(&["123 Main St", "Nowhere", "9 Oak Ave"]);
    let mut log: Vec<String> = Vec::new();

    let summary = Enricher::new(fixture()).enrich(&mut places, &mut log).await;

    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.failed, 1);
    assert!(places[0].coordinates.is_some());
    assert!(places[2].coordinates.is_some());

    assert_eq!(places[1].coordinates, None);
    assert_eq!(
        places[1].error.as_deref(),
        Some("no geocoding results for 'Nowhere'")
    );
    assert_eq!(log.len(), 1);
    assert_eq!(Severity::of(&log[0]), Severity::Error);
    assert!(!log.contains(&ABORT_LINE.to_string()));
}

struct FlakyGeocoder;

#[async_trait]
impl Geocoder for FlakyGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        if query.contains("Elm") {
            Err(MapError::Geocode("service unavailable".to_string()))
        } else {
            Ok(vec![candidate(1.0, 2.0, None, query)])
        }
    }
}

#[tokio::test]
async fn geocoder_errors_do_not_stop_siblings() {
    let mut places = locations(&["1 Elm St", "2 Pine St"]);
    places[0].coordinates = Some(LatLng::new(0.0, 0.0));
    let mut log: Vec<String> = Vec::new();

    let summary = Enricher::new(FlakyGeocoder).enrich(&mut places, &mut log).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(places[0].coordinates, None);
    assert_eq!(
        places[0].error.as_deref(),
        Some("geocoding failed: service unavailable")
    );
    assert_eq!(places[1].coordinates, Some(LatLng::new(1.0, 2.0)));
}

/// Answers only once every expected query is in flight.
struct RendezvousGeocoder {
    barrier: Arc<Barrier>,
}

#[async_trait]
impl Geocoder for RendezvousGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        self.barrier.wait().await;
        Ok(vec![candidate(0.5, 0.5, None, query)])
    }
}

#[tokio::test]
async fn lookups_run_concurrently() {
    let names = ["a", "b", "c", "d"];
    let mut places = locations(&names);
    let mut log: Vec<String> = Vec::new();
    let enricher = Enricher::new(RendezvousGeocoder {
        barrier: Arc::new(Barrier::new(names.len())),
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        enricher.enrich(&mut places, &mut log),
    )
    .await
    .expect("lookups were issued together");

    assert_eq!(summary.resolved, names.len());
}

#[tokio::test]
async fn enrichment_runs_on_a_spawned_task() {
    let handle = tokio::spawn(async move {
        let mut places = locations(&["123 Main St", "Nowhere"]);
        let mut log: Vec<String> = Vec::new();
        let summary = Enricher::new(fixture()).enrich(&mut places, &mut log).await;
        (summary, places, log)
    });

    let (summary, places, log) = handle.await.expect("task finished");
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.failed, 1);
    assert!(places[0].coordinates.is_some());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn enriched_graph_picks_markers() {
    let rows = vec![
        vec!["Parent 1", "Child 1", "Passenger Capacity", "Address"],
        vec!["Alice", "Bob", "4", "123 Main St"],
        vec!["Carl", "Dora", "", "9 Oak Ave"],
        vec!["Erin", "", "", "Nowhere"],
    ];
    let mut log: Vec<String> = Vec::new();
    let mut graph = parse(&rows, &mut log).expect("roster parsed");

    Enricher::new(fixture())
        .enrich(&mut graph.locations, &mut log)
        .await;

    let markers: Vec<Marker> = graph
        .locations
        .iter()
        .map(|location| graph.marker_for(location))
        .collect();
    assert_eq!(markers, vec![Marker::Vehicle, Marker::Standard, Marker::Error]);

    // A vehicle reference that resolves to nothing is also an error.
    let mut dangling = graph.locations[1].clone();
    dangling.vehicle = Some(42);
    assert_eq!(graph.marker_for(&dangling), Marker::Error);
    assert!(graph.vehicle_for(&graph.locations[0]).is_some());
}
