use ndarray::Array2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Covariance – uncertainty structure attached to an observation
// ---------------------------------------------------------------------------

/// Data covariance over the samples of one observation (N×N).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Covariance {
    pub data: Array2<f64>,
}

impl Covariance {
    pub fn new(data: Array2<f64>) -> Self {
        Covariance { data }
    }

    /// Diagonal covariance from per-sample variances.
    pub fn from_variances(variances: &[f64]) -> Self {
        let n = variances.len();
        let mut data = Array2::zeros((n, n));
        for (i, v) in variances.iter().enumerate() {
            data[[i, i]] = *v;
        }
        Covariance { data }
    }

    /// Number of samples the matrix spans.
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        let (rows, cols) = self.data.dim();
        if rows != cols {
            return false;
        }
        (0..rows).all(|i| (i + 1..cols).all(|j| (self.data[[i, j]] - self.data[[j, i]]).abs() <= tol))
    }
}

// ---------------------------------------------------------------------------
// InterferogramObservation – one unwrapped, subsampled InSAR scene
// ---------------------------------------------------------------------------

/// Line-of-sight displacement samples of one scene with geometry and
/// covariance. All per-sample vectors share one length N and the covariance
/// is N×N; [`crate::data::matfile::QuadScene`] enforces this on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterferogramObservation {
    /// Scene identifier the record was loaded from.
    pub name: String,
    /// LOS displacement [m].
    pub displacement: Vec<f64>,
    pub utm_easting: Vec<f64>,
    pub utm_northing: Vec<f64>,
    /// Derived from the UTM pair [deg].
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub covariance: Covariance,
    /// Look-vector incidence angle, as stored in the source file.
    pub incidence: Vec<f64>,
    /// Look-vector heading, as stored in the source file.
    pub heading: Vec<f64>,
    /// Overlap discard weights.
    pub odw: Vec<f64>,
}

impl InterferogramObservation {
    pub fn len(&self) -> usize {
        self.displacement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GNSS stations
// ---------------------------------------------------------------------------

/// One velocity component (E, N or U) of a station, in m/yr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsComponent {
    pub name: char,
    pub velocity: f64,
    pub two_sigma: f64,
}

impl GpsComponent {
    pub fn sigma(&self) -> f64 {
        self.two_sigma / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsStation {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    /// Insertion-ordered; names are unique.
    components: Vec<GpsComponent>,
}

impl GpsStation {
    pub fn new(name: impl Into<String>, lon: f64, lat: f64) -> Self {
        GpsStation {
            name: name.into(),
            lon,
            lat,
            components: Vec::new(),
        }
    }

    /// Add a component, replacing any existing one with the same name.
    pub fn add_component(&mut self, component: GpsComponent) {
        match self.components.iter_mut().find(|c| c.name == component.name) {
            Some(slot) => *slot = component,
            None => self.components.push(component),
        }
    }

    pub fn component(&self, name: char) -> Option<&GpsComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn components(&self) -> &[GpsComponent] {
        &self.components
    }

    pub fn component_names(&self) -> Vec<char> {
        self.components.iter().map(|c| c.name).collect()
    }
}

/// Cross-station collection of one velocity component, used as a single
/// modelling target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsCompoundComponent {
    pub name: char,
    pub station_names: Vec<String>,
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub velocities: Vec<f64>,
    pub sigmas: Vec<f64>,
    /// Diagonal, σ² per station.
    pub covariance: Covariance,
}

impl GpsCompoundComponent {
    pub fn len(&self) -> usize {
        self.station_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.station_names.is_empty()
    }
}

/// All stations of one velocity table, keyed by name in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsDataset {
    stations: Vec<GpsStation>,
}

impl GpsDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station; a station with the same name is replaced in place.
    pub fn add_station(&mut self, station: GpsStation) {
        match self.stations.iter_mut().find(|s| s.name == station.name) {
            Some(slot) => {
                log::warn!("Station {} listed twice, keeping the later entry", station.name);
                *slot = station;
            }
            None => self.stations.push(station),
        }
    }

    /// Drop every station whose name is in `names`. Unknown names are ignored.
    pub fn remove_stations<'a, I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for name in names {
            let before = self.stations.len();
            self.stations.retain(|s| &s.name != name);
            if self.stations.len() == before {
                log::debug!("Blacklisted station {name} not in dataset");
            }
        }
    }

    pub fn get_station(&self, name: &str) -> Option<&GpsStation> {
        self.stations.iter().find(|s| s.name == name)
    }

    pub fn stations(&self) -> &[GpsStation] {
        &self.stations
    }

    pub fn station_names(&self) -> Vec<&str> {
        self.stations.iter().map(|s| s.name.as_str()).collect()
    }

    /// Component alphabet, taken from the first station.
    pub fn component_names(&self) -> Option<Vec<char>> {
        self.stations.first().map(GpsStation::component_names)
    }

    /// Gather component `name` across all stations that carry it.
    pub fn get_compound(&self, name: char) -> GpsCompoundComponent {
        let mut compound = GpsCompoundComponent {
            name,
            station_names: Vec::new(),
            lons: Vec::new(),
            lats: Vec::new(),
            velocities: Vec::new(),
            sigmas: Vec::new(),
            covariance: Covariance::from_variances(&[]),
        };
        for station in &self.stations {
            if let Some(comp) = station.component(name) {
                compound.station_names.push(station.name.clone());
                compound.lons.push(station.lon);
                compound.lats.push(station.lat);
                compound.velocities.push(comp.velocity);
                compound.sigmas.push(comp.sigma());
            }
        }
        let variances: Vec<f64> = compound.sigmas.iter().map(|s| s * s).collect();
        compound.covariance = Covariance::from_variances(&variances);
        compound
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Seismic station metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationChannel {
    pub name: String,
    pub azimuth: Option<f64>,
    pub dip: Option<f64>,
    pub gain: f64,
}

/// A seismic station as listed in the station metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub network: String,
    pub station: String,
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub depth: f64,
    pub description: String,
    pub channels: Vec<StationChannel>,
}

impl Station {
    /// `NET.STA.LOC` code.
    pub fn nsl(&self) -> String {
        format!("{}.{}.{}", self.network, self.station, self.location)
    }
}

// ---------------------------------------------------------------------------
// WaveformTrace
// ---------------------------------------------------------------------------

/// One contiguous segment of a seismogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformTrace {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    /// Start time [s].
    pub tmin: f64,
    /// Sampling interval [s].
    pub deltat: f64,
    ydata: Vec<f64>,
}

impl WaveformTrace {
    pub fn new(
        network: impl Into<String>,
        station: impl Into<String>,
        location: impl Into<String>,
        channel: impl Into<String>,
        tmin: f64,
        deltat: f64,
        ydata: Vec<f64>,
    ) -> Self {
        WaveformTrace {
            network: network.into(),
            station: station.into(),
            location: location.into(),
            channel: channel.into(),
            tmin,
            deltat,
            ydata,
        }
    }

    pub fn ydata(&self) -> &[f64] {
        &self.ydata
    }

    pub fn ydata_mut(&mut self) -> &mut [f64] {
        &mut self.ydata
    }

    pub fn set_ydata(&mut self, ydata: Vec<f64>) {
        self.ydata = ydata;
    }

    /// Samples per second.
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.deltat
    }

    /// Time of the last sample [s].
    pub fn tmax(&self) -> f64 {
        self.tmin + self.deltat * self.ydata.len().saturating_sub(1) as f64
    }

    pub fn len(&self) -> usize {
        self.ydata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ydata.is_empty()
    }
}
