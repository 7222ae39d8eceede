//! Integration tests for [`geo_ingest::data::loader::load_sar_data`].
//!
//! Scenes are written as `.npz` archives into a [`tempfile::TempDir`].

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::NpzWriter;
use tempfile::TempDir;

use geo_ingest::data::loader::{covariance_path, load_sar_data, scene_path, SarOptions};
use geo_ingest::data::matfile::NpzMatrixReader;
use geo_ingest::data::projection::UtmZone;
use geo_ingest::IngestError;

fn opts() -> SarOptions {
    SarOptions {
        zone: UtmZone::north(36),
        extension: "npz".to_string(),
    }
}

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn write_quad(dir: &Path, id: &str, n: usize, with_odw: bool) {
    write_quad_with(dir, id, n, |npz| {
        if with_odw {
            npz.add_array("ODW_sub", &Array1::from_elem(n, 1.0)).unwrap();
        }
    });
}

/// Scene without `ODW_sub`; `extra` adds whatever else the archive holds.
fn write_quad_with(dir: &Path, id: &str, n: usize, extra: impl FnOnce(&mut NpzWriter<File>)) {
    let cfoc = Array2::from_shape_fn((n, 2), |(i, j)| {
        if j == 0 {
            500_000.0 + 1000.0 * i as f64
        } else {
            4_000_000.0 + 500.0 * i as f64
        }
    });
    let mut npz = NpzWriter::new(File::create(scene_path(dir, id, "npz")).unwrap());
    npz.add_array("cfoc", &cfoc).unwrap();
    npz.add_array("sqval", &Array1::from_shape_fn(n, |i| 0.01 * i as f64)).unwrap();
    npz.add_array("lvQT.inci", &Array1::from_elem(n, 0.6)).unwrap();
    npz.add_array("lvQT.head", &Array1::from_elem(n, -0.2)).unwrap();
    extra(&mut npz);
    npz.finish().unwrap();
}

fn write_cov(dir: &Path, id: &str, n: usize) {
    let mut npz = NpzWriter::new(File::create(covariance_path(dir, id, "npz")).unwrap());
    npz.add_array("Cov", &Array2::<f64>::eye(n)).unwrap();
    npz.finish().unwrap();
}

fn write_pair(dir: &Path, id: &str, n: usize) {
    write_quad(dir, id, n, true);
    write_cov(dir, id, n);
}

#[test]
fn observation_shapes_match_sample_count() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "A", 7);

    let obs = load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &opts()).unwrap();
    assert_eq!(obs.len(), 1);
    let ifg = &obs[0];
    assert_eq!(ifg.name, "A");
    for len in [
        ifg.displacement.len(),
        ifg.utm_easting.len(),
        ifg.utm_northing.len(),
        ifg.longitude.len(),
        ifg.latitude.len(),
        ifg.incidence.len(),
        ifg.heading.len(),
        ifg.odw.len(),
    ] {
        assert_eq!(len, 7);
    }
    assert_eq!(ifg.covariance.data.dim(), (7, 7));
    assert!(ifg.covariance.is_symmetric(0.0));
}

#[test]
fn coordinates_are_projected_from_utm() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "A", 3);

    let ifg = load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &opts())
        .unwrap()
        .remove(0);
    // first sample sits on the zone 36 central meridian
    assert!((ifg.longitude[0] - 33.0).abs() < 1e-9);
    assert!(ifg.latitude[0] > 36.0 && ifg.latitude[0] < 36.3);
    assert!(ifg.longitude[2] > 33.0);
}

#[test]
fn missing_covariance_skips_only_that_scene() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "A", 4);
    write_quad(tmp.path(), "B", 4, true);

    let obs = load_sar_data(tmp.path(), &ids(&["A", "B"]), &NpzMatrixReader, &opts()).unwrap();
    assert_eq!(obs.len(), 1);
    assert_eq!(obs[0].name, "A");
}

#[test]
fn results_are_tagged_with_the_scene_actually_loaded() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "B", 3);
    write_pair(tmp.path(), "D", 5);

    let scenes = ids(&["A", "B", "C", "D"]);
    let obs = load_sar_data(tmp.path(), &scenes, &NpzMatrixReader, &opts()).unwrap();
    let names: Vec<&str> = obs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["B", "D"]);
    assert_eq!(obs[1].len(), 5);
    // caller's list untouched
    assert_eq!(scenes.len(), 4);
}

#[test]
fn unreadable_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "A", 2);
    std::fs::write(scene_path(tmp.path(), "B", "npz"), b"not a zip archive").unwrap();
    write_cov(tmp.path(), "B", 2);

    let obs = load_sar_data(tmp.path(), &ids(&["A", "B"]), &NpzMatrixReader, &opts()).unwrap();
    assert_eq!(obs.len(), 1);
}

#[test]
fn corrupt_covariance_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "A", 2);
    write_quad(tmp.path(), "B", 2, true);
    std::fs::write(covariance_path(tmp.path(), "B", "npz"), b"\x00\x01garbage").unwrap();

    let obs = load_sar_data(tmp.path(), &ids(&["A", "B"]), &NpzMatrixReader, &opts()).unwrap();
    let names: Vec<&str> = obs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["A"]);
}

#[test]
fn unrelated_members_are_ignored() {
    let tmp = TempDir::new().unwrap();
    write_quad_with(tmp.path(), "A", 4, |npz| {
        npz.add_array("ODW_sub", &Array1::from_elem(4, 1.0)).unwrap();
        npz.add_array("pixel_idx", &Array1::from_shape_fn(4, |i| i as i64)).unwrap();
        npz.add_array("notes_f32", &Array1::<f32>::zeros(2)).unwrap();
    });
    write_cov(tmp.path(), "A", 4);

    let obs = load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &opts()).unwrap();
    assert_eq!(obs.len(), 1);
    assert_eq!(obs[0].odw, vec![1.0; 4]);
}

#[test]
fn non_f64_required_field_fails_loudly() {
    let tmp = TempDir::new().unwrap();
    write_quad_with(tmp.path(), "A", 3, |npz| {
        npz.add_array("ODW_sub", &Array1::<f32>::ones(3)).unwrap();
    });
    write_cov(tmp.path(), "A", 3);

    match load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &opts()) {
        Err(IngestError::MalformedStructure { field, reason, .. }) => {
            assert_eq!(field, "ODW_sub");
            assert!(reason.contains("dtype"), "reason: {reason}");
        }
        other => panic!("expected MalformedStructure, got {other:?}"),
    }
}

#[test]
fn missing_field_fails_loudly() {
    let tmp = TempDir::new().unwrap();
    write_quad(tmp.path(), "A", 3, false);
    write_cov(tmp.path(), "A", 3);

    match load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &opts()) {
        Err(IngestError::MalformedStructure { field, .. }) => assert_eq!(field, "ODW_sub"),
        other => panic!("expected MalformedStructure, got {other:?}"),
    }
}

#[test]
fn covariance_size_must_match_scene() {
    let tmp = TempDir::new().unwrap();
    write_quad(tmp.path(), "A", 3, true);
    write_cov(tmp.path(), "A", 4);

    assert!(matches!(
        load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &opts()),
        Err(IngestError::MalformedStructure { .. })
    ));
}

#[test]
fn invalid_zone_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let bad = SarOptions {
        zone: UtmZone::north(0),
        extension: "npz".into(),
    };
    assert!(matches!(
        load_sar_data(tmp.path(), &ids(&["A"]), &NpzMatrixReader, &bad),
        Err(IngestError::Config(_))
    ));
}
