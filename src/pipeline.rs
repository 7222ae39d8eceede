use serde::{Deserialize, Serialize};

use crate::config::IngestConfig;
use crate::data::loader::{
    load_and_blacklist_gps, load_and_blacklist_stations, load_data_traces, load_sar_data,
    NpzWaveformReader, SarOptions, StationFileReader,
};
use crate::data::matfile::NpzMatrixReader;
use crate::data::model::{GpsCompoundComponent, InterferogramObservation, Station, WaveformTrace};
use crate::error::IngestResult;

// ---------------------------------------------------------------------------
// IngestReport – everything one run produced
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub interferograms: Vec<InterferogramObservation>,
    pub gps_targets: Vec<GpsCompoundComponent>,
    pub stations: Vec<Station>,
    pub traces: Vec<WaveformTrace>,
}

impl IngestReport {
    /// One line per dataset, for logging.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for ifg in &self.interferograms {
            lines.push(format!("interferogram {}: {} samples", ifg.name, ifg.len()));
        }
        for target in &self.gps_targets {
            lines.push(format!("gps component {}: {} stations", target.name, target.len()));
        }
        if !self.stations.is_empty() || !self.traces.is_empty() {
            lines.push(format!(
                "seismic: {} stations, {} traces",
                self.stations.len(),
                self.traces.len()
            ));
        }
        lines
    }
}

/// Run every loader the config enables, with the default file readers.
pub fn run(config: &IngestConfig) -> IngestResult<IngestReport> {
    config.validate()?;
    let dir = config.data_dir.as_path();
    let mut report = IngestReport::default();

    if let Some(insar) = &config.insar {
        let opts = SarOptions {
            zone: config.projection,
            extension: insar.extension.clone(),
        };
        report.interferograms = load_sar_data(dir, &insar.scenes, &NpzMatrixReader, &opts)?;
    }

    if let Some(gps) = &config.gps {
        report.gps_targets = load_and_blacklist_gps(dir, &gps.filename, &gps.blacklist, &config.units)?;
    }

    if let Some(seismic) = &config.seismic {
        report.stations = load_and_blacklist_stations(
            dir,
            &seismic.stations_file,
            &seismic.blacklist,
            &StationFileReader,
        )?;
        report.traces = load_data_traces(
            dir,
            &report.stations,
            &seismic.channels,
            &seismic.format,
            &config.units,
            &NpzWaveformReader,
        )?;
    }

    Ok(report)
}
