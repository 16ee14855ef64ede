//! Placeholder site geometry.
//!
//! Real site boundaries have not been surveyed yet, so every site is
//! mapped as a fixed axis-aligned square centered on its resolved
//! coordinate, plus a point marker at the coordinate itself.

use geo_types::{Coord, LineString, Point, Polygon};

use crate::models::GeoPoint;

/// Half-extent of the placeholder square, degrees latitude.
pub const DEFAULT_HALF_LAT: f64 = 0.01;

/// Half-extent of the placeholder square, degrees longitude. Wider than
/// the latitude half-extent because a degree of longitude covers less
/// ground at Delaware latitudes.
pub const DEFAULT_HALF_LON: f64 = 0.015;

/// Square ring around a site coordinate, corners ordered SW, SE, NE, NW
/// and explicitly closed back to SW.
pub fn placeholder_square(center: GeoPoint, half_lat: f64, half_lon: f64) -> Polygon<f64> {
    let GeoPoint { lat, lon } = center;
    let ring = LineString::new(vec![
        Coord { x: lon - half_lon, y: lat - half_lat },
        Coord { x: lon + half_lon, y: lat - half_lat },
        Coord { x: lon + half_lon, y: lat + half_lat },
        Coord { x: lon - half_lon, y: lat + half_lat },
        Coord { x: lon - half_lon, y: lat - half_lat },
    ]);
    Polygon::new(ring, vec![])
}

/// Point marker at the site coordinate.
pub fn site_point(center: GeoPoint) -> Point<f64> {
    Point::new(center.lon, center.lat)
}
