//! Writes a small synthetic data directory that `geo-ingest` can load:
//! two InSAR scenes, a GNSS velocity table, a station file, reference
//! waveforms and a matching `config.json`.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::{arr0, Array1, Array2};
use ndarray_npy::NpzWriter;

use geo_ingest::config::UnitScales;
use geo_ingest::data::loader::{covariance_path, scene_path, trace_file_name, write_ascii_gps};
use geo_ingest::data::model::{GpsComponent, GpsDataset, GpsStation, Station};
use geo_ingest::data::projection::{lonlat_to_utm, UtmZone};

const ZONE: u8 = 36;
const SCENES: [&str; 2] = ["asc", "dsc"];
const SOURCE: (f64, f64) = (33.0, 36.0);

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic geo-ingest data directory")]
struct Args {
    #[arg(long, default_value = "sample_data")]
    out: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// SplitMix64 stream, reproducible per seed.
struct SampleRng(u64);

impl SampleRng {
    fn next_bits(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_bits() >> 11) as f64 * f64::EPSILON / 2.0;
        lo + (hi - lo) * unit
    }

    /// Normal deviate by Box-Muller.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let radius = (-2.0 * self.uniform(f64::MIN_POSITIVE, 1.0).ln()).sqrt();
        let angle = self.uniform(0.0, std::f64::consts::TAU);
        mean + std_dev * radius * angle.cos()
    }
}

fn write_scene(dir: &Path, id: &str, look: (f64, f64), rng: &mut SampleRng) -> Result<usize> {
    let zone = UtmZone::north(ZONE);
    let (lons, lats): (Vec<f64>, Vec<f64>) = (0..60)
        .map(|_| (rng.uniform(32.0, 34.0), rng.uniform(35.0, 37.0)))
        .unzip();
    let (east, north) = lonlat_to_utm(&lons, &lats, &zone)?;
    let n = east.len();

    let cfoc = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { east[i] } else { north[i] });
    let sqval: Array1<f64> = lons
        .iter()
        .zip(&lats)
        .map(|(&lon, &lat)| {
            let r = ((lon - SOURCE.0).powi(2) + (lat - SOURCE.1).powi(2)).sqrt();
            gaussian(r, 0.0, 0.3, 0.05) + rng.gauss(0.0, 0.002)
        })
        .collect();

    // exponential covariance, 5 mm sill, 20 km range
    let cov = Array2::from_shape_fn((n, n), |(i, j)| {
        let d = ((east[i] - east[j]).powi(2) + (north[i] - north[j]).powi(2)).sqrt();
        0.005_f64.powi(2) * (-d / 20_000.0).exp()
    });

    let mut quad = NpzWriter::new(File::create(scene_path(dir, id, "npz"))?);
    quad.add_array("cfoc", &cfoc)?;
    quad.add_array("sqval", &sqval)?;
    quad.add_array("lvQT.inci", &Array1::from_elem(n, look.0))?;
    quad.add_array("lvQT.head", &Array1::from_elem(n, look.1))?;
    quad.add_array("ODW_sub", &Array1::from_elem(n, 1.0))?;
    quad.finish()?;

    let mut covs = NpzWriter::new(File::create(covariance_path(dir, id, "npz"))?);
    covs.add_array("Cov", &cov)?;
    covs.finish()?;
    Ok(n)
}

fn write_gps(dir: &Path, rng: &mut SampleRng) -> Result<()> {
    let mut ds = GpsDataset::new();
    for i in 0..12 {
        let mut st = GpsStation::new(
            format!("G{i:03}"),
            rng.uniform(32.0, 34.0),
            rng.uniform(35.0, 37.0),
        );
        for (name, scale) in [('E', 5.0), ('N', 3.0), ('U', 1.0)] {
            st.add_component(GpsComponent {
                name,
                velocity: rng.gauss(0.0, scale) / 1000.0,
                two_sigma: rng.uniform(0.5, 2.0) / 1000.0,
            });
        }
        ds.add_station(st);
    }
    write_ascii_gps(&ds, &dir.join("velocities.txt"), &UnitScales::default())?;
    Ok(())
}

fn write_seismic(dir: &Path, rng: &mut SampleRng) -> Result<usize> {
    let stations: Vec<Station> = ["APE", "ANTO", "KULA", "ISP"]
        .iter()
        .enumerate()
        .map(|(i, code)| Station {
            network: (if i % 2 == 0 { "GE" } else { "IU" }).to_string(),
            station: code.to_string(),
            location: String::new(),
            lat: rng.uniform(35.0, 40.0),
            lon: rng.uniform(25.0, 35.0),
            elevation: rng.uniform(0.0, 1000.0),
            depth: 0.0,
            description: String::new(),
            channels: Vec::new(),
        })
        .collect();

    let mut text = String::from("# network.station.location lat lon elevation depth\n");
    for st in &stations {
        text.push_str(&format!(
            "{} {:.4} {:.4} {:.1} {:.1}\n  BHZ 0 -90 1\n  BHT nan 0 1\n",
            st.nsl(),
            st.lat,
            st.lon,
            st.elevation,
            st.depth
        ));
    }
    std::fs::write(dir.join("stations.txt"), text)?;

    let mut written = 0;
    for cha in ["u", "r"] {
        // leave one file out so the loader has something to skip
        for st in stations.iter().filter(|s| !(cha == "r" && s.station == "ISP")) {
            let ydata: Array1<f64> = (0..500)
                .map(|k| {
                    let t = k as f64 * 0.05;
                    gaussian(t, 10.0, 1.5, 200.0) * (3.0 * t).sin() + rng.gauss(0.0, 2.0)
                })
                .collect();
            let path = dir.join(trace_file_name(st, cha, "npz"));
            let mut npz = NpzWriter::new(File::create(&path)?);
            npz.add_array("ydata", &ydata)?;
            npz.add_array("deltat", &arr0(0.05))?;
            npz.add_array("tmin", &arr0(0.0))?;
            npz.finish()?;
            written += 1;
        }
    }
    Ok(written)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SampleRng(args.seed);

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    for (id, look) in SCENES.iter().zip([(0.61, -0.21), (0.58, -2.93)]) {
        let n = write_scene(&args.out, id, look, &mut rng)
            .with_context(|| format!("writing scene {id}"))?;
        log::info!("Wrote scene {id} with {n} samples");
    }
    write_gps(&args.out, &mut rng).context("writing GPS table")?;
    let traces = write_seismic(&args.out, &mut rng).context("writing waveforms")?;

    let config = serde_json::json!({
        "data_dir": args.out,
        "projection": { "zone": ZONE, "northern": true },
        "insar": { "scenes": SCENES },
        "gps": { "filename": "velocities.txt", "blacklist": ["G003"] },
        "seismic": { "blacklist": ["KULA"], "channels": ["Z", "T"] }
    });
    let config_path = args.out.join("config.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!(
        "Wrote {} scenes, 12 GPS stations and {traces} traces to {}",
        SCENES.len(),
        args.out.display()
    );
    println!("Run: geo-ingest --config {}", config_path.display());
    Ok(())
}
