//! Survey site records from the input listings.

use serde::{Deserialize, Serialize};

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One survey site, as listed in the input CSV.
#[derive(Debug, Clone)]
pub struct SiteRecord {
    /// Shellfish zone identifier (e.g. "Z1")
    pub zone_id: String,

    /// Human-readable zone name
    pub zone_name: String,

    /// Site name as surveyors refer to it
    pub site_name: String,

    /// Free-text name used to build geocoder queries
    pub geocode_name: String,

    /// Hand-entered coordinates from optional `lat`/`lon` columns.
    /// Present only when both fields parse as finite numbers.
    pub manual_coords: Option<GeoPoint>,
}
