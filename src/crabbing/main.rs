//! Main entry point for the crabbing site map builder.
//!
//! Resolves each site through a fallback chain of candidate queries
//! bounded to the Delaware viewbox, honoring hand-entered coordinates
//! where the listing provides them.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shellmap::config::SurveyConfig;
use shellmap::features::write_feature_collection;
use shellmap::geocode::{build_candidates, GeocodeCache, NominatimClient, ResolveOptions};
use shellmap::pipeline::{assemble_features, RunOptions};
use shellmap::sites::load_sites;

/// Cache-key tag for this variant's bounded lookups. Entries written by
/// the unbounded clamming variant never collide with these.
const RESOLUTION_CONTEXT: &str = "DE_VIEWBOX_US";

#[derive(Parser, Debug)]
#[command(name = "crabbing")]
#[command(about = "Build the crabbing site GeoJSON layer")]
struct Args {
    /// Input CSV of crabbing sites
    #[arg(short, long, default_value = "data/crabbing_sites.csv")]
    input: PathBuf,

    /// Output GeoJSON file
    #[arg(short, long, default_value = "data/crabbing_polygons.geojson")]
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

    info!("Shellmap crabbing layer");
    info!("Input: {}", args.input.display());

    let config = match &args.config {
        Some(path) => SurveyConfig::load_from_file(path)?,
        None => SurveyConfig::default(),
    };

    let sites = load_sites(&args.input)?;
    let mut cache = GeocodeCache::load(&args.cache)?;
    let geocoder = NominatimClient::new(&config.geocoder, Some(config.search_area.clone()))?;

    let options = RunOptions {
        resolve: ResolveOptions {
            context: Some(RESOLUTION_CONTEXT.to_string()),
            record_query: true,
        },
        manual_overrides: true,
        ..RunOptions::default()
    };

    let vocab = config.candidates.clone();
    let (features, _stats) = assemble_features(
        &sites,
        &geocoder,
        &mut cache,
        &options,
        |site| build_candidates(&site.geocode_name, &site.site_name, &vocab),
    )
    .await?;

    cache.save()?;
    write_feature_collection(&args.output, features)?;

    Ok(())
}
