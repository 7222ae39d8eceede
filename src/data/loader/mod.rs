//! Loaders: files on disk → normalized records.
//!
//! Each loader is independent and stateless. Items (scenes, stations,
//! channels) are processed as map → filter → collect, so output order is
//! always the input order and a missing item only drops itself.

mod gps;
mod insar;
mod stations;
mod waveform;

pub use gps::{load_and_blacklist_gps, load_ascii_gps, write_ascii_gps, GPS_COMPONENTS};
pub use insar::{covariance_path, load_sar_data, scene_path, SarOptions};
pub use stations::{load_and_blacklist_stations, StationFileReader, StationReader};
pub use waveform::{
    load_data_traces, reference_channel, trace_file_name, NpzWaveformReader, WaveformReader,
    TRACE_NAME_DIVIDER,
};
