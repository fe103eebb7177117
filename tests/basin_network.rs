/// Integration tests over the checked-in Illinois River basin
///
/// These tests verify:
/// 1. basin.toml loads and resolves into one network per office
/// 2. Cumulative distances follow each stream's direction convention
/// 3. Upstream closure follows confluences and diversion parents
/// 4. Aggregate drainage area stops at the nearest upstream gauge
/// 5. Resolution rejects broken references without touching other offices
///
/// Run with: cargo test --test basin_network

use basin_connectivity::config::{load_basin_default, load_basin_str};
use basin_connectivity::error::{NetworkError, QueryError};
use basin_connectivity::network::{BasinNetwork, resolve, resolve_by_office};
use basin_connectivity::stream::CwmsId;

fn mvr(name: &str) -> CwmsId {
    CwmsId::new("MVR", name)
}

fn illinois_basin() -> BasinNetwork {
    let streams = load_basin_default().expect("basin.toml should load");
    resolve(streams).expect("Illinois basin should resolve")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn test_basin_resolves_with_expected_shape() {
    let network = illinois_basin();

    assert_eq!(network.stream_count(), 4);
    assert_eq!(network.location_count(), 10);

    let outlets: Vec<&str> = network.outlets().map(|s| s.stream_id()).collect();
    assert_eq!(outlets, ["Hennepin Canal", "Illinois River"]);

    let mut tributaries: Vec<&str> = network
        .confluence_tributaries_of(&mvr("Illinois River"))
        .iter()
        .map(|id| id.name.as_str())
        .collect();
    tributaries.sort();
    assert_eq!(tributaries, ["Mackinaw River", "Spoon River"]);

    let diversions = network.diversions_from(&mvr("Illinois River"));
    assert_eq!(diversions, [mvr("Hennepin Canal")]);
}

#[test]
fn test_resolve_by_office_keeps_good_office_when_another_fails() {
    let mut streams = load_basin_default().unwrap();
    streams.extend(
        load_basin_str(
            r#"
            [[stream]]
            office = "SWT"
            id = "Polecat Creek"
            length = 21.0

            [stream.confluence]
            stream = "Arkansas River"
            station = 512.3
            bank = "L"
        "#,
        )
        .unwrap(),
    );

    let results = resolve_by_office(streams, 2);
    assert_eq!(results.len(), 2);

    let mvr_network = results["MVR"].as_ref().expect("MVR should still resolve");
    assert_eq!(mvr_network.stream_count(), 4);

    match &results["SWT"] {
        Err(NetworkError::DanglingReference { missing, .. }) => {
            assert_eq!(missing, "Arkansas River");
        }
        other => panic!("expected dangling reference, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

#[test]
fn test_mainstem_distance_is_river_mile() {
    let network = illinois_basin();
    assert_close(network.cumulative_distance(&mvr("Kingston Mines")).unwrap(), 145.6);
    assert_close(network.cumulative_distance(&mvr("Grafton")).unwrap(), 0.0);
}

#[test]
fn test_tributary_distance_adds_confluence_river_mile() {
    let network = illinois_basin();
    // 15.8 up the Mackinaw, which joins at Illinois River mile 147.8.
    assert_close(network.cumulative_distance(&mvr("Green Valley")).unwrap(), 163.6);
    assert_close(network.stream_mouth_distance(&mvr("Spoon River")).unwrap(), 120.4);
}

#[test]
fn test_head_stationed_canal_measures_to_its_own_end() {
    let network = illinois_basin();
    // Canal is stationed from its head; Sheffield is 104.5 - 28.0 above its end.
    assert_close(network.cumulative_distance(&mvr("Sheffield")).unwrap(), 76.5);
}

// ---------------------------------------------------------------------------
// Upstream closure
// ---------------------------------------------------------------------------

#[test]
fn test_upstream_of_kingston_mines() {
    let network = illinois_basin();
    let names: Vec<String> = network
        .upstream_of(&mvr("Kingston Mines"))
        .unwrap()
        .iter()
        .map(|e| e.location.id().name.clone())
        .collect();

    assert_eq!(
        names,
        ["Green Valley", "Peoria", "Chillicothe", "Henry", "Marseilles"],
        "Spoon River joins below and the canal carries flow away"
    );
}

#[test]
fn test_upstream_of_canal_reaches_into_parent_above_diversion() {
    let network = illinois_basin();
    let entries = network.upstream_of(&mvr("Sheffield")).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.location.id().name.as_str()).collect();

    assert_eq!(names, ["Bureau Junction", "Marseilles"]);
    assert_close(entries[0].cumulative_distance.unwrap(), 104.5);
}

#[test]
fn test_upstream_streams_of_grafton() {
    let network = illinois_basin();
    let streams: Vec<&str> = network
        .upstream_streams_of(&mvr("Grafton"))
        .unwrap()
        .into_iter()
        .map(|s| s.stream_id())
        .collect();
    assert_eq!(streams, ["Illinois River", "Spoon River", "Mackinaw River"]);
}

// ---------------------------------------------------------------------------
// Drainage
// ---------------------------------------------------------------------------

#[test]
fn test_gauge_reports_its_own_area() {
    let network = illinois_basin();
    assert_close(network.aggregate_drainage_area(&mvr("Henry")).unwrap(), 13543.0);
}

#[test]
fn test_mouth_area_adds_tributaries_below_nearest_gauge() {
    let network = illinois_basin();
    // Kingston Mines covers the Mackinaw; the Spoon joins below it.
    assert_close(
        network.aggregate_drainage_area(&mvr("Grafton")).unwrap(),
        15818.0 + 1636.0,
    );
}

#[test]
fn test_stage_only_station_takes_next_gauge_upstream() {
    let network = illinois_basin();
    assert_close(network.aggregate_drainage_area(&mvr("Chillicothe")).unwrap(), 13543.0);
}

#[test]
fn test_canal_drains_parent_above_diversion() {
    let network = illinois_basin();
    assert_close(network.aggregate_drainage_area(&mvr("Sheffield")).unwrap(), 8259.0);
}

#[test]
fn test_unknown_location_query_fails() {
    let network = illinois_basin();
    assert_eq!(
        network.aggregate_drainage_area(&mvr("Havana")),
        Err(QueryError::UnknownLocation(mvr("Havana")))
    );
}
