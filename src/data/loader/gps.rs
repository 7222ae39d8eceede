use std::path::Path;

use crate::config::UnitScales;
use crate::data::filter::{apply_gps_blacklist, compound_targets, Blacklist};
use crate::data::model::{GpsComponent, GpsCompoundComponent, GpsDataset, GpsStation};
use crate::error::{IngestError, IngestResult};

/// Component order of the velocity and uncertainty column groups.
pub const GPS_COMPONENTS: [char; 3] = ['E', 'N', 'U'];

/// Columns after the station name: lon, lat, 3 velocities, 3 uncertainties.
const NUMERIC_COLUMNS: usize = 8;

/// Load a whitespace-separated station velocity table.
///
/// Columns: `name lon lat ve vn vu sigma_ve sigma_vn sigma_vu`, location in
/// decimal degrees, velocities in the table's unit (mm/yr by default). Lines
/// that are blank or start with `#` are skipped; columns past the ninth are
/// ignored.
///
/// A row with fewer than nine columns still counts as a station name but
/// contributes no numeric row, so the load fails with
/// [`IngestError::RowCountMismatch`].
pub fn load_ascii_gps(dir: &Path, filename: &str, units: &UnitScales) -> IngestResult<GpsDataset> {
    let path = dir.join(filename);
    if !path.is_file() {
        return Err(IngestError::MissingFile { path });
    }
    let text = std::fs::read_to_string(&path)?;

    let mut names: Vec<&str> = Vec::new();
    let mut rows: Vec<[f64; NUMERIC_COLUMNS]> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        names.push(tokens[0]);
        if tokens.len() <= NUMERIC_COLUMNS {
            log::debug!("{}:{}: only {} columns", path.display(), line_no + 1, tokens.len());
            continue;
        }

        let mut row = [0.0; NUMERIC_COLUMNS];
        for (slot, tok) in row.iter_mut().zip(&tokens[1..=NUMERIC_COLUMNS]) {
            *slot = tok.parse::<f64>().map_err(|_| IngestError::Parse {
                path: path.clone(),
                line: line_no + 1,
                message: format!("'{tok}' is not a number"),
            })?;
        }
        rows.push(row);
    }

    if names.len() != rows.len() {
        return Err(IngestError::RowCountMismatch {
            path,
            names: names.len(),
            rows: rows.len(),
        });
    }

    let mut data = GpsDataset::new();
    for (name, d) in names.iter().zip(&rows) {
        let mut station = GpsStation::new(*name, d[0], d[1]);
        for (j, comp) in GPS_COMPONENTS.iter().enumerate() {
            station.add_component(GpsComponent {
                name: *comp,
                velocity: d[j + 2] / units.velocity_divisor,
                two_sigma: d[j + 5] / units.velocity_divisor,
            });
        }
        data.add_station(station);
    }

    log::info!("Loaded {} GPS stations from {}", data.len(), path.display());
    Ok(data)
}

/// Load a station velocity table, drop blacklisted stations and build one
/// compound target per component.
pub fn load_and_blacklist_gps(
    dir: &Path,
    filename: &str,
    blacklist: &Blacklist,
    units: &UnitScales,
) -> IngestResult<Vec<GpsCompoundComponent>> {
    let mut dataset = load_ascii_gps(dir, filename, units)?;
    apply_gps_blacklist(&mut dataset, blacklist);
    compound_targets(&dataset)
}

/// Write `dataset` back as a table [`load_ascii_gps`] reads, values scaled
/// back to the table unit.
pub fn write_ascii_gps(dataset: &GpsDataset, path: &Path, units: &UnitScales) -> IngestResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(["#name", "lon", "lat", "ve", "vn", "vu", "sigma_ve", "sigma_vn", "sigma_vu"])?;

    for station in dataset.stations() {
        let mut record = vec![station.name.clone(), station.lon.to_string(), station.lat.to_string()];
        let comps: Vec<&GpsComponent> = GPS_COMPONENTS
            .iter()
            .map(|c| {
                station.component(*c).ok_or_else(|| {
                    IngestError::malformed(path, c.to_string(), format!("missing at station {}", station.name))
                })
            })
            .collect::<IngestResult<_>>()?;
        record.extend(comps.iter().map(|c| (c.velocity * units.velocity_divisor).to_string()));
        record.extend(comps.iter().map(|c| (c.two_sigma * units.velocity_divisor).to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
