use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use geo_ingest::config::IngestConfig;
use geo_ingest::pipeline;

#[derive(Parser)]
#[command(name = "geo-ingest")]
#[command(about = "Normalize InSAR, GNSS and seismic observation files")]
#[command(version)]
struct Cli {
    /// JSON run configuration
    #[arg(long, short)]
    config: PathBuf,

    /// Write all loaded records to this JSON file
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = IngestConfig::from_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let report = pipeline::run(&config).context("ingesting data")?;

    for line in report.summary() {
        log::info!("{line}");
    }

    if let Some(out) = &cli.output {
        let file = std::fs::File::create(out)
            .with_context(|| format!("creating {}", out.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report)
            .context("writing report")?;
        log::info!("Wrote report to {}", out.display());
    }
    Ok(())
}
