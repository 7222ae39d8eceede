//! Integration tests for the station-velocity table loader and GPS
//! blacklisting.

use std::collections::BTreeSet;
use std::path::Path;

use tempfile::TempDir;

use geo_ingest::config::UnitScales;
use geo_ingest::data::filter::blacklist_from;
use geo_ingest::data::loader::{load_and_blacklist_gps, load_ascii_gps, write_ascii_gps};
use geo_ingest::IngestError;

const TABLE: &str = "\
# name lon lat ve vn vu sigma_ve sigma_vn sigma_vu
ALPH 33.10 36.20  1.5 -2.0  0.3  0.4 0.5 1.1
BETA 33.80 35.90 12.0  4.25 -1.0 0.6 0.6 1.8
GAMM 32.70 36.60 -3.3  0.0  2.2  0.3 0.4 0.9
";

/// The numeric part of [`TABLE`], row by row.
const VALUES: [[f64; 8]; 3] = [
    [33.10, 36.20, 1.5, -2.0, 0.3, 0.4, 0.5, 1.1],
    [33.80, 35.90, 12.0, 4.25, -1.0, 0.6, 0.6, 1.8],
    [32.70, 36.60, -3.3, 0.0, 2.2, 0.3, 0.4, 0.9],
];

fn write_table(dir: &Path, text: &str) {
    std::fs::write(dir.join("velocities.txt"), text).unwrap();
}

#[test]
fn one_station_per_row_values_divided_by_1000() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), TABLE);

    let ds = load_ascii_gps(tmp.path(), "velocities.txt", &UnitScales::default()).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.station_names(), vec!["ALPH", "BETA", "GAMM"]);

    for (station, row) in ds.stations().iter().zip(VALUES.iter()) {
        assert_eq!(station.lon, row[0]);
        assert_eq!(station.lat, row[1]);
        assert_eq!(station.components().len(), 3);
        for (j, comp) in station.components().iter().enumerate() {
            assert_eq!(comp.name, ['E', 'N', 'U'][j]);
            assert_eq!(comp.velocity, row[j + 2] / 1000.0);
            assert_eq!(comp.two_sigma, row[j + 5] / 1000.0);
        }
    }
}

#[test]
fn truncated_row_is_row_count_mismatch() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), &format!("{TABLE}DELT 33.0 36.0 1.0\n"));

    match load_ascii_gps(tmp.path(), "velocities.txt", &UnitScales::default()) {
        Err(IngestError::RowCountMismatch { names, rows, .. }) => {
            assert_eq!(names, 4);
            assert_eq!(rows, 3);
        }
        other => panic!("expected RowCountMismatch, got {other:?}"),
    }
}

#[test]
fn blacklist_removes_stations_from_targets() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), TABLE);

    let targets = load_and_blacklist_gps(
        tmp.path(),
        "velocities.txt",
        &blacklist_from(["BETA", "NOT_THERE"]),
        &UnitScales::default(),
    )
    .unwrap();

    assert_eq!(targets.len(), 3);
    for target in &targets {
        assert_eq!(target.station_names, vec!["ALPH", "GAMM"]);
        assert_eq!(target.covariance.size(), 2);
    }
    let up = targets.iter().find(|t| t.name == 'U').unwrap();
    assert_eq!(up.velocities, vec![0.3 / 1000.0, 2.2 / 1000.0]);
    assert_eq!(up.sigmas, vec![1.1 / 1000.0 / 2.0, 0.9 / 1000.0 / 2.0]);
}

#[test]
fn empty_blacklist_keeps_everything() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), TABLE);

    let targets = load_and_blacklist_gps(
        tmp.path(),
        "velocities.txt",
        &BTreeSet::new(),
        &UnitScales::default(),
    )
    .unwrap();
    assert!(targets.iter().all(|t| t.len() == 3));
}

#[test]
fn blacklisting_every_station_is_empty_after_filter() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), TABLE);

    let result = load_and_blacklist_gps(
        tmp.path(),
        "velocities.txt",
        &blacklist_from(["ALPH", "BETA", "GAMM"]),
        &UnitScales::default(),
    );
    assert!(matches!(result, Err(IngestError::EmptyAfterFilter)));
}

#[test]
fn custom_divisor_is_applied() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), TABLE);
    let units = UnitScales {
        velocity_divisor: 1.0,
        ..UnitScales::default()
    };

    let ds = load_ascii_gps(tmp.path(), "velocities.txt", &units).unwrap();
    let beta = ds.get_station("BETA").unwrap();
    assert_eq!(beta.component('E').unwrap().velocity, 12.0);
}

#[test]
fn written_table_reloads_to_same_dataset() {
    let tmp = TempDir::new().unwrap();
    write_table(tmp.path(), TABLE);
    let units = UnitScales::default();
    let original = load_ascii_gps(tmp.path(), "velocities.txt", &units).unwrap();

    let out = tmp.path().join("copy.txt");
    write_ascii_gps(&original, &out, &units).unwrap();
    let reloaded = load_ascii_gps(tmp.path(), "copy.txt", &units).unwrap();

    assert_eq!(reloaded.station_names(), original.station_names());
    assert_eq!(reloaded.component_names(), original.component_names());
    for (a, b) in original.stations().iter().zip(reloaded.stations()) {
        assert_eq!(a.lon, b.lon);
        assert_eq!(a.lat, b.lat);
        for (ca, cb) in a.components().iter().zip(b.components()) {
            assert_eq!(ca.name, cb.name);
            assert!((ca.velocity - cb.velocity).abs() < 1e-15);
            assert!((ca.two_sigma - cb.two_sigma).abs() < 1e-15);
        }
    }
}
