use std::fs::File;
use std::path::Path;

use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::NpzReader;

use crate::config::UnitScales;
use crate::data::model::{Station, WaveformTrace};
use crate::error::{IngestError, IngestResult};

pub const TRACE_NAME_DIVIDER: &str = "-";
const TRACE_NAME_PREFIX: &str = "reference";

/// Source of waveform segments.
pub trait WaveformReader {
    /// All segments stored in `path`, which is encoded as `format`.
    fn read(&self, path: &Path, format: &str) -> IngestResult<Vec<WaveformTrace>>;
}

/// Map a requested channel to the channel code used in reference file
/// names: vertical `Z` → `u` (up), transverse `T` → `r` (right).
pub fn reference_channel(channel: &str) -> IngestResult<&'static str> {
    match channel {
        "Z" => Ok("u"),
        "T" => Ok("r"),
        other => Err(IngestError::UnsupportedChannel(other.to_string())),
    }
}

/// `reference-<network>-<station>-<channel>.<format>`
pub fn trace_file_name(station: &Station, ref_channel: &str, format: &str) -> String {
    let stem = [
        TRACE_NAME_PREFIX,
        station.network.as_str(),
        station.station.as_str(),
        ref_channel,
    ]
    .join(TRACE_NAME_DIVIDER);
    format!("{stem}.{format}")
}

/// Load the reference trace of every (channel, station) pair, rescaled to
/// metres.
///
/// Channels are all validated before any file is touched. Output is
/// channel-major: every station for the first channel, then every station
/// for the next. Missing files are skipped with a warning; a file that
/// exists but cannot be read aborts the call.
pub fn load_data_traces<R, S>(
    dir: &Path,
    stations: &[Station],
    channels: &[S],
    format: &str,
    units: &UnitScales,
    reader: &R,
) -> IngestResult<Vec<WaveformTrace>>
where
    R: WaveformReader,
    S: AsRef<str>,
{
    let ref_channels: Vec<&'static str> = channels
        .iter()
        .map(|c| reference_channel(c.as_ref()))
        .collect::<IngestResult<_>>()?;

    let traces: Vec<WaveformTrace> = ref_channels
        .iter()
        .flat_map(|cha| stations.iter().map(move |st| (*cha, st)))
        .map(|(cha, st)| load_trace(dir, st, cha, format, units, reader))
        .filter_map(Result::transpose)
        .collect::<IngestResult<_>>()?;

    log::info!(
        "Loaded {} of {} traces from {}",
        traces.len(),
        ref_channels.len() * stations.len(),
        dir.display()
    );
    Ok(traces)
}

fn load_trace<R: WaveformReader>(
    dir: &Path,
    station: &Station,
    ref_channel: &str,
    format: &str,
    units: &UnitScales,
    reader: &R,
) -> IngestResult<Option<WaveformTrace>> {
    let trace_name = trace_file_name(station, ref_channel, format);
    let path = dir.join(&trace_name);
    if !path.is_file() {
        log::warn!("Unable to open file: {trace_name}");
        return Ok(None);
    }

    let mut trace = reader
        .read(&path, format)?
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::malformed(&path, "ydata", "no trace segment in file"))?;

    // [nm] -> [m]
    for y in trace.ydata_mut() {
        *y *= units.amplitude_factor;
    }
    Ok(Some(trace))
}

// ---------------------------------------------------------------------------
// NPZ waveform container
// ---------------------------------------------------------------------------

/// Reads single-segment traces from `.npz` archives with members `ydata`,
/// `deltat` and optionally `tmin`. Codes come from the file stem
/// (`reference-NET-STA-CHA`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NpzWaveformReader;

impl NpzWaveformReader {
    pub const FORMAT: &'static str = "npz";
}

impl WaveformReader for NpzWaveformReader {
    fn read(&self, path: &Path, format: &str) -> IngestResult<Vec<WaveformTrace>> {
        if format != Self::FORMAT {
            return Err(IngestError::Config(format!(
                "waveform format '{format}' is not supported by the npz reader"
            )));
        }
        if !path.is_file() {
            return Err(IngestError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let npz_err = |source| IngestError::Npz {
            path: path.to_path_buf(),
            source,
        };

        let mut npz = NpzReader::new(File::open(path)?).map_err(npz_err)?;
        let members = npz.names().map_err(npz_err)?;
        let mut member = |name: &str| -> IngestResult<Option<Vec<f64>>> {
            let Some(raw) = members
                .iter()
                .find(|m| m.strip_suffix(".npy").unwrap_or(m.as_str()) == name)
            else {
                return Ok(None);
            };
            let arr: ArrayD<f64> = npz.by_name::<OwnedRepr<f64>, IxDyn>(raw).map_err(npz_err)?;
            Ok(Some(arr.iter().copied().collect()))
        };

        let ydata = member("ydata")?.ok_or_else(|| IngestError::malformed(path, "ydata", "is missing"))?;
        let deltat = scalar(path, "deltat", member("deltat")?)?
            .ok_or_else(|| IngestError::malformed(path, "deltat", "is missing"))?;
        let tmin = scalar(path, "tmin", member("tmin")?)?.unwrap_or(0.0);

        if deltat.is_nan() || deltat <= 0.0 {
            return Err(IngestError::malformed(path, "deltat", format!("must be positive, got {deltat}")));
        }

        let (network, station, channel) = codes_from_path(path);
        Ok(vec![WaveformTrace::new(network, station, "", channel, tmin, deltat, ydata)])
    }
}

fn scalar(path: &Path, name: &str, values: Option<Vec<f64>>) -> IngestResult<Option<f64>> {
    match values.as_deref() {
        None => Ok(None),
        Some([v]) => Ok(Some(*v)),
        Some(other) => Err(IngestError::malformed(
            path,
            name,
            format!("should be a scalar, got {} values", other.len()),
        )),
    }
}

fn codes_from_path(path: &Path) -> (String, String, String) {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let parts: Vec<&str> = stem.split(TRACE_NAME_DIVIDER).collect();
    match parts.as_slice() {
        [TRACE_NAME_PREFIX, net, sta, cha] => (net.to_string(), sta.to_string(), cha.to_string()),
        _ => (String::new(), stem.to_string(), String::new()),
    }
}
