//! Core data models for the survey mapping pipeline.

pub mod geocode;
pub mod site;

pub use geocode::GeocodeHit;
pub use site::{GeoPoint, SiteRecord};
