use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::projection::UtmZone;
use crate::error::{IngestError, IngestResult};

/// Millimetres per metre: station tables are given in mm/yr.
pub const MM_PER_M: f64 = 1000.0;
/// Metres per nanometre: waveform files store displacement in nm.
pub const M_PER_NM: f64 = 0.000000001;

// ---------------------------------------------------------------------------
// Unit policy
// ---------------------------------------------------------------------------

/// Scale factors applied once at load time to reach metres (per year).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitScales {
    /// Station-table velocities and uncertainties are divided by this.
    pub velocity_divisor: f64,
    /// Waveform amplitudes are multiplied by this.
    pub amplitude_factor: f64,
}

impl Default for UnitScales {
    fn default() -> Self {
        Self {
            velocity_divisor: MM_PER_M,
            amplitude_factor: M_PER_NM,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-dataset sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsarConfig {
    /// Scene identifiers, looked up as `quad_<id>` / `CovMatrix_<id>`.
    pub scenes: Vec<String>,
    #[serde(default = "default_matrix_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsConfig {
    pub filename: String,
    #[serde(default)]
    pub blacklist: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeismicConfig {
    #[serde(default = "default_stations_file")]
    pub stations_file: String,
    #[serde(default)]
    pub blacklist: BTreeSet<String>,
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    #[serde(default = "default_waveform_format")]
    pub format: String,
}

fn default_matrix_extension() -> String {
    "npz".to_string()
}

fn default_stations_file() -> String {
    "stations.txt".to_string()
}

fn default_channels() -> Vec<String> {
    vec!["Z".to_string(), "T".to_string()]
}

fn default_waveform_format() -> String {
    "npz".to_string()
}

// ---------------------------------------------------------------------------
// IngestConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for one ingestion run.
///
/// ```json
/// {
///   "data_dir": "data/",
///   "projection": { "zone": 36 },
///   "insar":   { "scenes": ["asc", "dsc"] },
///   "gps":     { "filename": "velocities.txt", "blacklist": ["BAD1"] },
///   "seismic": { "channels": ["Z"] }
/// }
/// ```
///
/// The UTM zone has no default; a run without it is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub projection: UtmZone,
    #[serde(default)]
    pub units: UnitScales,
    #[serde(default)]
    pub insar: Option<InsarConfig>,
    #[serde(default)]
    pub gps: Option<GpsConfig>,
    #[serde(default)]
    pub seismic: Option<SeismicConfig>,
}

impl IngestConfig {
    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> IngestResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> IngestResult<Self> {
        let config: IngestConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IngestResult<()> {
        self.projection.validate()?;

        let units = &self.units;
        if !(units.velocity_divisor.is_finite() && units.velocity_divisor > 0.0) {
            return Err(IngestError::Config(format!(
                "velocity_divisor must be a positive number, got {}",
                units.velocity_divisor
            )));
        }
        if !(units.amplitude_factor.is_finite() && units.amplitude_factor > 0.0) {
            return Err(IngestError::Config(format!(
                "amplitude_factor must be a positive number, got {}",
                units.amplitude_factor
            )));
        }

        if let Some(insar) = &self.insar {
            if insar.extension.is_empty() {
                return Err(IngestError::Config("insar.extension is empty".into()));
            }
        }
        if let Some(seismic) = &self.seismic {
            if seismic.format.is_empty() {
                return Err(IngestError::Config("seismic.format is empty".into()));
            }
        }
        Ok(())
    }
}
