//! Named-field matrix containers and the typed schemas read from them.
//!
//! A scene is stored as two companion files: `quad_<id>` with the
//! subsampled displacement field and `CovMatrix_<id>` with its data
//! covariance. Both are exposed to the loader as a [`MatrixFile`], a flat
//! map of field name → array. Nested structs are flattened with a dot, so
//! the look-vector struct `lvQT` contributes `lvQT.inci` and `lvQT.head`.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError};

use crate::error::{IngestError, IngestResult};

pub const FIELD_COORDINATES: &str = "cfoc";
pub const FIELD_DISPLACEMENT: &str = "sqval";
pub const FIELD_INCIDENCE: &str = "lvQT.inci";
pub const FIELD_HEADING: &str = "lvQT.head";
pub const FIELD_ODW: &str = "ODW_sub";
pub const FIELD_COVARIANCE: &str = "Cov";

// ---------------------------------------------------------------------------
// MatrixFile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MatrixFile {
    pub path: PathBuf,
    pub fields: BTreeMap<String, ArrayD<f64>>,
}

impl MatrixFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MatrixFile {
            path: path.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, array: ArrayD<f64>) -> Self {
        self.fields.insert(name.into(), array);
        self
    }

    pub fn field(&self, name: &str) -> IngestResult<&ArrayD<f64>> {
        self.fields
            .get(name)
            .ok_or_else(|| IngestError::malformed(&self.path, name, "is missing"))
    }

    /// A field as a flat vector. Accepts 0-d, 1-d and single-row/column 2-d
    /// arrays, the shapes MATLAB exports squeeze to.
    pub fn vector(&self, name: &str) -> IngestResult<Vec<f64>> {
        let arr = self.field(name)?;
        let squeezed = arr.shape().iter().filter(|&&d| d != 1).count() <= 1;
        if !squeezed {
            return Err(IngestError::malformed(
                &self.path,
                name,
                format!("should be a vector, got shape {:?}", arr.shape()),
            ));
        }
        Ok(arr.iter().copied().collect())
    }

    pub fn matrix(&self, name: &str) -> IngestResult<Array2<f64>> {
        let arr = self.field(name)?;
        arr.clone().into_dimensionality::<ndarray::Ix2>().map_err(|_| {
            IngestError::malformed(
                &self.path,
                name,
                format!("should be 2-D, got shape {:?}", arr.shape()),
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Source of [`MatrixFile`]s.
pub trait MatrixReader {
    /// Read the named `fields` of `path`. Fields the file does not contain
    /// are left out of the result; everything else in the file is ignored.
    fn read(&self, path: &Path, fields: &[&str]) -> IngestResult<MatrixFile>;
}

/// Reads NumPy `.npz` archives. Requested members must be stored as `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpzMatrixReader;

impl MatrixReader for NpzMatrixReader {
    fn read(&self, path: &Path, fields: &[&str]) -> IngestResult<MatrixFile> {
        if !path.is_file() {
            return Err(IngestError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let npz_err = |source| IngestError::Npz {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path)?;
        let mut npz = NpzReader::new(file).map_err(npz_err)?;
        let members = npz.names().map_err(npz_err)?;

        let mut matfile = MatrixFile::new(path);
        for &field in fields {
            let Some(member) = members
                .iter()
                .find(|m| m.strip_suffix(".npy").unwrap_or(m.as_str()) == field)
            else {
                continue;
            };
            let array = match npz.by_name::<OwnedRepr<f64>, IxDyn>(member) {
                Ok(array) => array,
                Err(ReadNpzError::Npy(err @ ReadNpyError::WrongDescriptor(_))) => {
                    return Err(IngestError::malformed(
                        path,
                        field,
                        format!("has a dtype other than f64 ({err})"),
                    ));
                }
                Err(err) => return Err(npz_err(err)),
            };
            matfile.fields.insert(field.to_string(), array);
        }
        log::debug!(
            "Read {} of {} members from {}",
            matfile.fields.len(),
            members.len(),
            path.display()
        );
        Ok(matfile)
    }
}

// ---------------------------------------------------------------------------
// Typed schemas
// ---------------------------------------------------------------------------

/// Contents of a `quad_<id>` file after validation.
#[derive(Debug, Clone)]
pub struct QuadScene {
    pub utm_easting: Vec<f64>,
    pub utm_northing: Vec<f64>,
    pub displacement: Vec<f64>,
    pub incidence: Vec<f64>,
    pub heading: Vec<f64>,
    pub odw: Vec<f64>,
}

impl QuadScene {
    pub const FIELDS: [&'static str; 5] = [
        FIELD_COORDINATES,
        FIELD_DISPLACEMENT,
        FIELD_INCIDENCE,
        FIELD_HEADING,
        FIELD_ODW,
    ];

    pub fn from_matrix_file(mat: &MatrixFile) -> IngestResult<Self> {
        let cfoc = mat.matrix(FIELD_COORDINATES)?;
        if cfoc.ncols() != 2 {
            return Err(IngestError::malformed(
                &mat.path,
                FIELD_COORDINATES,
                format!("should have 2 columns (easting, northing), got {}", cfoc.ncols()),
            ));
        }
        let n = cfoc.nrows();
        let utm_easting = cfoc.column(0).to_vec();
        let utm_northing = cfoc.column(1).to_vec();

        let displacement = exact_len(mat, FIELD_DISPLACEMENT, n)?;
        let incidence = broadcast_len(mat, FIELD_INCIDENCE, n)?;
        let heading = broadcast_len(mat, FIELD_HEADING, n)?;
        let odw = exact_len(mat, FIELD_ODW, n)?;

        Ok(QuadScene {
            utm_easting,
            utm_northing,
            displacement,
            incidence,
            heading,
            odw,
        })
    }

    pub fn len(&self) -> usize {
        self.displacement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty()
    }
}

fn exact_len(mat: &MatrixFile, name: &str, n: usize) -> IngestResult<Vec<f64>> {
    let v = mat.vector(name)?;
    if v.len() != n {
        return Err(IngestError::malformed(
            &mat.path,
            name,
            format!("has {} samples, expected {n}", v.len()),
        ));
    }
    Ok(v)
}

/// Like [`exact_len`] but a single value is repeated for every sample.
fn broadcast_len(mat: &MatrixFile, name: &str, n: usize) -> IngestResult<Vec<f64>> {
    let v = mat.vector(name)?;
    if v.len() == 1 && n != 1 {
        return Ok(vec![v[0]; n]);
    }
    if v.len() != n {
        return Err(IngestError::malformed(
            &mat.path,
            name,
            format!("has {} samples, expected {n}", v.len()),
        ));
    }
    Ok(v)
}

/// Contents of a `CovMatrix_<id>` file after validation.
#[derive(Debug, Clone)]
pub struct CovarianceFile {
    pub cov: Array2<f64>,
}

impl CovarianceFile {
    pub const FIELDS: [&'static str; 1] = [FIELD_COVARIANCE];

    pub fn from_matrix_file(mat: &MatrixFile) -> IngestResult<Self> {
        let cov = mat.matrix(FIELD_COVARIANCE)?;
        if cov.nrows() != cov.ncols() {
            return Err(IngestError::malformed(
                &mat.path,
                FIELD_COVARIANCE,
                format!("should be square, got {}x{}", cov.nrows(), cov.ncols()),
            ));
        }
        Ok(CovarianceFile { cov })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn quad(n: usize) -> MatrixFile {
        let cfoc = Array2::from_shape_fn((n, 2), |(i, j)| (i * 10 + j) as f64);
        MatrixFile::new("quad_t.npz")
            .with_field(FIELD_COORDINATES, cfoc.into_dyn())
            .with_field(FIELD_DISPLACEMENT, arr1(&vec![0.01; n]).into_dyn())
            .with_field(FIELD_INCIDENCE, arr1(&vec![0.6; n]).into_dyn())
            .with_field(FIELD_HEADING, arr1(&[-0.2]).into_dyn())
            .with_field(FIELD_ODW, arr1(&vec![1.0; n]).into_dyn())
    }

    #[test]
    fn scene_fields_share_length() {
        let scene = QuadScene::from_matrix_file(&quad(4)).unwrap();
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.utm_easting, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(scene.utm_northing, vec![1.0, 11.0, 21.0, 31.0]);
        assert_eq!(scene.heading, vec![-0.2; 4]);
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut mat = quad(3);
        mat.fields.remove(FIELD_ODW);
        match QuadScene::from_matrix_file(&mat) {
            Err(IngestError::MalformedStructure { field, .. }) => assert_eq!(field, FIELD_ODW),
            other => panic!("expected MalformedStructure, got {other:?}"),
        }
    }

    #[test]
    fn short_displacement_is_malformed() {
        let mat = quad(3).with_field(FIELD_DISPLACEMENT, arr1(&[1.0, 2.0]).into_dyn());
        assert!(matches!(
            QuadScene::from_matrix_file(&mat),
            Err(IngestError::MalformedStructure { .. })
        ));
    }

    #[test]
    fn column_vector_is_squeezed() {
        let mat = MatrixFile::new("x").with_field("v", arr2(&[[1.0], [2.0]]).into_dyn());
        assert_eq!(mat.vector("v").unwrap(), vec![1.0, 2.0]);
        let bad = MatrixFile::new("x").with_field("v", arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn());
        assert!(bad.vector("v").is_err());
    }

    #[test]
    fn covariance_must_be_square() {
        let mat = MatrixFile::new("CovMatrix_t.npz")
            .with_field(FIELD_COVARIANCE, Array2::<f64>::zeros((2, 3)).into_dyn());
        assert!(CovarianceFile::from_matrix_file(&mat).is_err());
    }
}
