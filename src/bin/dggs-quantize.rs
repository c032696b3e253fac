use anyhow::Context;
use clap::Parser;
use dggs_quant::{GeoJsonLoader, JsonLinesStore, Quantizer};
use log::info;
use std::path::PathBuf;

/// Quantize a GeoJSON point dataset into per-cell statistics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// GeoJSON FeatureCollection of points
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the staging and output JSON-lines files
    #[arg(short, long, default_value = "dggs_output")]
    output_dir: PathBuf,

    /// Configuration file (.json or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    min_resolution: Option<u8>,

    #[arg(long)]
    max_resolution: Option<u8>,

    #[arg(short, long)]
    workers: Option<usize>,

    #[arg(long)]
    source_record_link: Option<String>,

    /// Leave the staged raw features in the output directory
    #[arg(long)]
    keep_staging: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = Quantizer::builder();
    if let Some(path) = &args.config {
        builder = builder
            .config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }

    let mut config = builder.build()?.config().clone();
    if let Some(min) = args.min_resolution {
        config.min_resolution = min;
    }
    if let Some(max) = args.max_resolution {
        config.max_resolution = max;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(link) = args.source_record_link {
        config.source_record_link = link;
    }
    config.keep_staging |= args.keep_staging;

    let quantizer = Quantizer::new(config)?;

    info!("Reading {}", args.input.display());
    let mut loader = GeoJsonLoader::from_path(&args.input);
    let mut store = JsonLinesStore::create(&args.output_dir)
        .with_context(|| format!("Failed to open {}", args.output_dir.display()))?;

    let report = quantizer.ingest(&mut loader, &mut store)?;

    for skipped in &report.skipped {
        println!("skipped feature {}: {}", skipped.index, skipped.reason);
    }
    println!("{}", report);
    for (resolution, rows) in &report.rows_per_resolution {
        println!("  resolution {:>2}: {} cells", resolution, rows);
    }
    println!("Output written to {}", store.output_path().display());

    Ok(())
}
