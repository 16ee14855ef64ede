//! GeoJSON feature construction and output.

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::geometry::{placeholder_square, site_point};
use crate::models::{GeoPoint, SiteRecord};

/// Identifier carried by every placeholder polygon. Boundary surveys will
/// eventually introduce more than one polygon per site.
const POLYGON_ID: &str = "A";

/// Marker distinguishing point features from polygons in the output.
const POINT_FEATURE_TYPE: &str = "site_point";

fn identity_properties(site: &SiteRecord) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("zone_id".to_string(), JsonValue::from(site.zone_id.clone()));
    props.insert(
        "zone_name".to_string(),
        JsonValue::from(site.zone_name.clone()),
    );
    props.insert(
        "site_name".to_string(),
        JsonValue::from(site.site_name.clone()),
    );
    props
}

/// Build the polygon and point feature pair for one located site.
pub fn site_features(
    site: &SiteRecord,
    center: GeoPoint,
    half_lat: f64,
    half_lon: f64,
) -> [Feature; 2] {
    let square = placeholder_square(center, half_lat, half_lon);
    let mut polygon_props = identity_properties(site);
    polygon_props.insert("polygon_id".to_string(), JsonValue::from(POLYGON_ID));

    let polygon = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&square))),
        id: None,
        properties: Some(polygon_props),
        foreign_members: None,
    };

    let marker = site_point(center);
    let mut point_props = identity_properties(site);
    point_props.insert(
        "feature_type".to_string(),
        JsonValue::from(POINT_FEATURE_TYPE),
    );

    let point = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&marker))),
        id: None,
        properties: Some(point_props),
        foreign_members: None,
    };

    [polygon, point]
}

/// Write the collection as a single compact GeoJSON file.
pub fn write_feature_collection(path: &Path, features: Vec<Feature>) -> Result<()> {
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let content = serde_json::to_string(&collection)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write GeoJSON output: {}", path.display()))?;
    info!("WROTE: {}", path.display());
    Ok(())
}
