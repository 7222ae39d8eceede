//! Normalizes geophysical observation files (InSAR scenes, GNSS station
//! velocities, seismic reference waveforms) into typed records in metres.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;

pub use error::{IngestError, IngestResult};
