use std::path::Path;

use crate::data::filter::{apply_station_blacklist, Blacklist};
use crate::data::model::{Station, StationChannel};
use crate::error::{IngestError, IngestResult};

/// Source of seismic station metadata.
pub trait StationReader {
    fn read(&self, path: &Path) -> IngestResult<Vec<Station>>;
}

/// Plain-text station file reader.
///
/// ```text
/// # network.station.location  lat  lon  elevation  depth  description
/// GE.APE.   37.07  25.52  620.0  0.0  Apollonas, Naxos
///   BHZ  0.0  -90.0  1.0
///   BHN  0.0    0.0
/// ```
///
/// Channel lines are indented and belong to the station above them;
/// azimuth and dip may be `nan`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationFileReader;

impl StationReader for StationFileReader {
    fn read(&self, path: &Path) -> IngestResult<Vec<Station>> {
        if !path.is_file() {
            return Err(IngestError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let mut stations: Vec<Station> = Vec::new();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let err = |message: String| IngestError::Parse {
                path: path.to_path_buf(),
                line: line_no + 1,
                message,
            };

            if raw.starts_with(char::is_whitespace) {
                let station = stations
                    .last_mut()
                    .ok_or_else(|| err("channel line before any station".into()))?;
                station.channels.push(parse_channel(line).map_err(err)?);
            } else {
                stations.push(parse_station(line).map_err(err)?);
            }
        }

        log::debug!("Read {} stations from {}", stations.len(), path.display());
        Ok(stations)
    }
}

fn parse_number(tok: &str, what: &str) -> Result<f64, String> {
    tok.parse::<f64>()
        .map_err(|_| format!("{what} '{tok}' is not a number"))
}

fn parse_station(line: &str) -> Result<Station, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(format!("station line needs at least 5 columns, got {}", tokens.len()));
    }
    let codes: Vec<&str> = tokens[0].split('.').collect();
    let (network, station, location) = match codes.as_slice() {
        [n, s] => (*n, *s, ""),
        [n, s, l] => (*n, *s, *l),
        _ => return Err(format!("'{}' is not a NET.STA.LOC code", tokens[0])),
    };
    if station.is_empty() {
        return Err(format!("'{}' has an empty station code", tokens[0]));
    }

    Ok(Station {
        network: network.to_string(),
        station: station.to_string(),
        location: location.to_string(),
        lat: parse_number(tokens[1], "latitude")?,
        lon: parse_number(tokens[2], "longitude")?,
        elevation: parse_number(tokens[3], "elevation")?,
        depth: parse_number(tokens[4], "depth")?,
        description: tokens[5..].join(" "),
        channels: Vec::new(),
    })
}

fn parse_channel(line: &str) -> Result<StationChannel, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if !(3..=4).contains(&tokens.len()) {
        return Err(format!("channel line needs 3 or 4 columns, got {}", tokens.len()));
    }
    let angle = |tok: &str, what: &str| -> Result<Option<f64>, String> {
        let v = parse_number(tok, what)?;
        Ok((!v.is_nan()).then_some(v))
    };
    Ok(StationChannel {
        name: tokens[0].to_string(),
        azimuth: angle(tokens[1], "azimuth")?,
        dip: angle(tokens[2], "dip")?,
        gain: match tokens.get(3) {
            Some(tok) => parse_number(tok, "gain")?,
            None => 1.0,
        },
    })
}

/// Read `<dir>/<stations_file>` and drop blacklisted stations.
///
/// Any reader failure is fatal; no partial list is returned.
pub fn load_and_blacklist_stations<R: StationReader>(
    dir: &Path,
    stations_file: &str,
    blacklist: &Blacklist,
    reader: &R,
) -> IngestResult<Vec<Station>> {
    let stations = reader.read(&dir.join(stations_file))?;
    let total = stations.len();
    let kept = apply_station_blacklist(stations, blacklist);
    log::info!("Loaded {} stations ({} blacklisted)", kept.len(), total - kept.len());
    Ok(kept)
}
