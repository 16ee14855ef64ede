//! Fallback resolution over candidate queries.

use tracing::debug;

use super::cache::{cache_key, GeocodeCache};
use super::client::{GeocodeError, Geocoder};
use crate::models::GeocodeHit;

/// Outcome of resolving one site's candidate sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Some candidate produced a coordinate.
    Found(GeocodeHit),
    /// The candidate sequence was exhausted without a match.
    NotFound,
}

/// Per-variant resolution settings.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Cache-key context tag isolating this strategy's entries
    pub context: Option<String>,

    /// Record which candidate produced each hit
    pub record_query: bool,
}

/// Try candidates in order against the cache, then the geocoder.
///
/// A cached outcome is the final answer for its chain: a cached hit
/// resolves the site, and a cached confirmed-absent ends the chain as
/// unresolved, in both cases without a network call. A fresh lookup is
/// cached whatever its outcome, so each distinct query string is sent
/// at most once across all runs; a fresh miss moves on to the next
/// candidate.
pub async fn resolve(
    geocoder: &dyn Geocoder,
    cache: &mut GeocodeCache,
    candidates: &[String],
    options: &ResolveOptions,
) -> Result<Resolution, GeocodeError> {
    for candidate in candidates {
        let query = candidate.trim();
        if query.is_empty() {
            continue;
        }

        let key = cache_key(query, options.context.as_deref());
        if let Some(outcome) = cache.get(&key) {
            debug!("Cache hit for '{}'", query);
            return Ok(match outcome {
                Some(hit) => Resolution::Found(hit.clone()),
                None => Resolution::NotFound,
            });
        }

        let mut outcome = geocoder.search(query).await?;
        if let Some(hit) = &mut outcome {
            if options.record_query {
                hit.query_used = Some(query.to_string());
            }
        }
        cache.insert(key, outcome.clone());

        if let Some(hit) = outcome {
            return Ok(Resolution::Found(hit));
        }
        debug!("No match for '{}', trying next candidate", query);
    }

    Ok(Resolution::NotFound)
}
