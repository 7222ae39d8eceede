/// Data layer: record types, readers, loaders and blacklisting.
///
/// Architecture:
/// ```text
///  quad_/CovMatrix_*.npz   velocities.txt   stations.txt   reference-*.npz
///        │                      │                │               │
///        ▼                      ▼                ▼               │
///   ┌──────────┐          ┌──────────┐     ┌──────────┐          │
///   │ matfile  │          │  loader  │     │  loader  │          │
///   │+projection│         │   gps    │     │ stations │          │
///   └──────────┘          └──────────┘     └──────────┘          │
///        │                      │                │               ▼
///        ▼                      ▼                ▼          ┌──────────┐
///  InterferogramObservation  ┌──────────┐   ┌──────────┐    │  loader  │
///                            │  filter  │   │  filter  │───▶│ waveform │
///                            └──────────┘   └──────────┘    └──────────┘
///                                 │                              │
///                                 ▼                              ▼
///                        GpsCompoundComponent              WaveformTrace
/// ```

pub mod filter;
pub mod loader;
pub mod matfile;
pub mod model;
pub mod projection;
