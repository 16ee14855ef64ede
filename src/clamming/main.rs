//! Main entry point for the clamming site map builder.
//!
//! Geocodes each site's `geocode_name` with a fixed ", Delaware, USA"
//! suffix and writes a placeholder polygon plus a point marker per site.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shellmap::config::SurveyConfig;
use shellmap::features::write_feature_collection;
use shellmap::geocode::{GeocodeCache, NominatimClient};
use shellmap::pipeline::{assemble_features, RunOptions};
use shellmap::sites::load_sites;

#[derive(Parser, Debug)]
#[command(name = "clamming")]
#[command(about = "Build the clamming site GeoJSON layer")]
struct Args {
    /// Input CSV of clamming sites
    #[arg(short, long, default_value = "data/clamming_sites.csv")]
    input: PathBuf,

    /// Output GeoJSON file
    #[arg(short, long, default_value = "data/clamming_polygons.geojson")]
    output: PathBuf,

    /// Geocode cache file, shared across runs and variants
    #[arg(long, default_value = "data/geocode_cache.json")]
    cache: PathBuf,

    /// Optional TOML file overriding the survey defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Shellmap clamming layer");
    info!("Input: {}", args.input.display());

    let config = match &args.config {
        Some(path) => SurveyConfig::load_from_file(path)?,
        None => SurveyConfig::default(),
    };

    let sites = load_sites(&args.input)?;
    let mut cache = GeocodeCache::load(&args.cache)?;
    let geocoder = NominatimClient::new(&config.geocoder, None)?;

    let (features, _stats) = assemble_features(
        &sites,
        &geocoder,
        &mut cache,
        &RunOptions::default(),
        |site| vec![format!("{}, Delaware, USA", site.geocode_name)],
    )
    .await?;

    cache.save()?;
    write_feature_collection(&args.output, features)?;

    Ok(())
}
