//! Geocoding: lookup cache, Nominatim client, candidate generation, and
//! fallback resolution.

mod cache;
mod candidates;
mod client;
mod resolver;

pub use cache::{cache_key, GeocodeCache};
pub use candidates::{build_candidates, RewriteRule};
pub use client::{GeocodeError, Geocoder, NominatimClient};
pub use resolver::{resolve, Resolution, ResolveOptions};
