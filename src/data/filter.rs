use std::collections::BTreeSet;

use super::model::{GpsCompoundComponent, GpsDataset, Station};
use crate::error::{IngestError, IngestResult};

// ---------------------------------------------------------------------------
// Blacklist: station names excluded before modelling
// ---------------------------------------------------------------------------

/// Station names to drop. Names that match nothing are ignored.
pub type Blacklist = BTreeSet<String>;

/// Build a [`Blacklist`] from any list of names.
pub fn blacklist_from<I, S>(names: I) -> Blacklist
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Remove blacklisted stations (matched on station code) from seismic
/// station metadata, keeping the order of the rest.
pub fn apply_station_blacklist(stations: Vec<Station>, blacklist: &Blacklist) -> Vec<Station> {
    let before = stations.len();
    let kept: Vec<Station> = stations
        .into_iter()
        .filter(|s| !blacklist.contains(&s.station))
        .collect();
    log::debug!("Blacklist removed {} of {before} stations", before - kept.len());
    kept
}

/// Remove blacklisted stations from a GNSS dataset in place.
pub fn apply_gps_blacklist(dataset: &mut GpsDataset, blacklist: &Blacklist) {
    let before = dataset.len();
    dataset.remove_stations(blacklist);
    log::debug!("Blacklist removed {} of {before} GPS stations", before - dataset.len());
}

/// One compound target per component, component alphabet taken from the
/// first remaining station.
///
/// Fails with [`IngestError::EmptyAfterFilter`] if no station is left.
pub fn compound_targets(dataset: &GpsDataset) -> IngestResult<Vec<GpsCompoundComponent>> {
    let comps = dataset.component_names().ok_or(IngestError::EmptyAfterFilter)?;
    Ok(comps.into_iter().map(|c| dataset.get_compound(c)).collect())
}
