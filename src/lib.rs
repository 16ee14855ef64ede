//! Shellmap - shellfish survey site maps from tabular listings
//!
//! This library provides shared types and modules for the clamming and crabbing binaries.

pub mod config;
pub mod features;
pub mod geocode;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod sites;

pub use models::{GeoPoint, GeocodeHit, SiteRecord};
