//! Geocoder match records, as stored in the lookup cache.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A successful geocoder match for one query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lon: f64,

    /// Provider's display name for the matched place
    pub display_name: String,

    /// The candidate query that produced this match. Only recorded by the
    /// fallback resolver; single-query lookups leave it unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_used: Option<String>,
}

impl GeocodeHit {
    /// The matched coordinate.
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }
}
