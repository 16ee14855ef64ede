//! Site listing loader.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::info;

use crate::models::{GeoPoint, SiteRecord};

const REQUIRED_COLUMNS: [&str; 4] = ["zone_id", "zone_name", "site_name", "geocode_name"];

/// Load site records from the input CSV.
///
/// The four identity columns must all be present; `lat`/`lon` columns are
/// optional and, when both exist, supply hand-entered coordinates.
pub fn load_sites(path: &Path) -> Result<Vec<SiteRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open site listing: {}", path.display()))?;

    let headers = reader.headers()?.clone();

    let mut indices = [0usize; 4];
    let mut missing = Vec::new();
    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match headers.iter().position(|h| h == *name) {
            Some(idx) => indices[slot] = idx,
            None => missing.push(*name),
        }
    }
    if !missing.is_empty() {
        missing.sort_unstable();
        bail!("Missing columns in CSV: {}", missing.join(", "));
    }
    let [zone_id_idx, zone_name_idx, site_name_idx, geocode_name_idx] = indices;

    let lat_idx = headers.iter().position(|h| h == "lat");
    let lon_idx = headers.iter().position(|h| h == "lon");

    let mut sites = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let manual_coords = match (lat_idx, lon_idx) {
            (Some(lat), Some(lon)) => parse_manual_coords(record.get(lat), record.get(lon)),
            _ => None,
        };

        sites.push(SiteRecord {
            zone_id: field(zone_id_idx),
            zone_name: field(zone_name_idx),
            site_name: field(site_name_idx),
            geocode_name: field(geocode_name_idx),
            manual_coords,
        });
    }

    info!("Loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Both fields must parse as finite numbers; anything else falls through
/// to geocoding.
fn parse_manual_coords(lat: Option<&str>, lon: Option<&str>) -> Option<GeoPoint> {
    let lat = lat?.trim().parse::<f64>().ok()?;
    let lon = lon?.trim().parse::<f64>().ok()?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    Some(GeoPoint { lat, lon })
}
