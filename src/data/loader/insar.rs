use std::path::{Path, PathBuf};

use crate::data::matfile::{CovarianceFile, MatrixFile, MatrixReader, QuadScene};
use crate::data::model::{Covariance, InterferogramObservation};
use crate::data::projection::{utm_to_lonlat, UtmZone};
use crate::error::{IngestError, IngestResult};

/// Per-run settings for [`load_sar_data`].
#[derive(Debug, Clone)]
pub struct SarOptions {
    pub zone: UtmZone,
    /// Matrix file extension without the dot.
    pub extension: String,
}

pub fn scene_path(dir: &Path, id: &str, extension: &str) -> PathBuf {
    dir.join(format!("quad_{id}.{extension}"))
}

pub fn covariance_path(dir: &Path, id: &str, extension: &str) -> PathBuf {
    dir.join(format!("CovMatrix_{id}.{extension}"))
}

/// Load every scene in `ids` whose data and covariance files are both
/// readable. Results keep the order of `ids` and carry the id they came from.
///
/// A missing or unreadable companion file skips that scene with a warning.
/// A file that reads fine but lacks an expected field aborts the whole call
/// with [`IngestError::MalformedStructure`].
pub fn load_sar_data<R: MatrixReader>(
    dir: &Path,
    ids: &[String],
    reader: &R,
    opts: &SarOptions,
) -> IngestResult<Vec<InterferogramObservation>> {
    opts.zone.validate()?;

    let loaded: Vec<InterferogramObservation> = ids
        .iter()
        .map(|id| load_scene(dir, id, reader, opts))
        .filter_map(Result::transpose)
        .collect::<IngestResult<_>>()?;

    log::info!(
        "Loaded {} of {} interferograms from {}",
        loaded.len(),
        ids.len(),
        dir.display()
    );
    Ok(loaded)
}

/// `Ok(None)` when the scene has to be skipped.
fn load_scene<R: MatrixReader>(
    dir: &Path,
    id: &str,
    reader: &R,
    opts: &SarOptions,
) -> IngestResult<Option<InterferogramObservation>> {
    let data_path = scene_path(dir, id, &opts.extension);
    let cov_path = covariance_path(dir, id, &opts.extension);

    let data = try_read(reader, &data_path, &QuadScene::FIELDS)?;
    let covs = try_read(reader, &cov_path, &CovarianceFile::FIELDS)?;
    let (Some(data), Some(covs)) = (data, covs) else {
        log::warn!("Scene {id} in {} was no SAR data?! Skipping", dir.display());
        return Ok(None);
    };

    let scene = QuadScene::from_matrix_file(&data)?;
    let cov = CovarianceFile::from_matrix_file(&covs)?;
    if cov.cov.nrows() != scene.len() {
        return Err(IngestError::malformed(
            &cov_path,
            "Cov",
            format!(
                "is {0}x{0} but the scene has {1} samples",
                cov.cov.nrows(),
                scene.len()
            ),
        ));
    }

    let (longitude, latitude) = utm_to_lonlat(&scene.utm_easting, &scene.utm_northing, &opts.zone)?;

    log::debug!("Scene {id}: {} samples", scene.len());
    Ok(Some(InterferogramObservation {
        name: id.to_string(),
        displacement: scene.displacement,
        utm_easting: scene.utm_easting,
        utm_northing: scene.utm_northing,
        longitude,
        latitude,
        covariance: Covariance::new(cov.cov),
        incidence: scene.incidence,
        heading: scene.heading,
        odw: scene.odw,
    }))
}

/// `Ok(None)` when the file is absent or cannot be decoded; a file that
/// decodes but holds a wrongly typed field is an error.
fn try_read<R: MatrixReader>(
    reader: &R,
    path: &Path,
    fields: &[&str],
) -> IngestResult<Option<MatrixFile>> {
    if !path.is_file() {
        log::warn!("File {} does not exist.", path.display());
        return Ok(None);
    }
    match reader.read(path, fields) {
        Ok(mat) => Ok(Some(mat)),
        Err(err @ IngestError::MalformedStructure { .. }) => Err(err),
        Err(err) => {
            log::warn!("Unable to read {}: {err}", path.display());
            Ok(None)
        }
    }
}
