//! Persistent cache of geocoder lookups.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;
use xxhash_rust::xxh64::xxh64;

use crate::models::GeocodeHit;

/// Cache key for a query string, optionally tagged with a resolution
/// context. The tag keeps resolution strategies that share query text
/// from reading each other's entries.
pub fn cache_key(query: &str, context: Option<&str>) -> String {
    let text = match context {
        Some(tag) => format!("{}|{}", query, tag),
        None => query.to_string(),
    };
    format!("{:016x}", xxh64(text.as_bytes(), 0))
}

/// Disk-backed map from query hash to lookup outcome.
///
/// `Some(hit)` is a resolved coordinate; `None` records a query the
/// provider confirmed has no match, so it is never sent again. Entries
/// are only ever added, never evicted.
#[derive(Debug)]
pub struct GeocodeCache {
    path: PathBuf,
    entries: BTreeMap<String, Option<GeocodeHit>>,
}

impl GeocodeCache {
    /// Load the cache file, or start empty if none exists yet.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Corrupt geocode cache: {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read geocode cache: {}", path.display())
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Write the cache back to disk, pretty-printed so operators can
    /// inspect and hand-prune it.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write geocode cache: {}", self.path.display()))?;
        info!(
            "Saved {} cache entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Look up a key. The outer `None` means the query was never sent;
    /// `Some(None)` means the provider confirmed there is no match.
    pub fn get(&self, key: &str) -> Option<&Option<GeocodeHit>> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, outcome: Option<GeocodeHit>) {
        self.entries.insert(key, outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hit() -> GeocodeHit {
        GeocodeHit {
            lat: 39.0,
            lon: -75.3,
            display_name: "Smith Pier, Kent County, Delaware".to_string(),
            query_used: Some("Smith Pier, DE".to_string()),
        }
    }

    #[test]
    fn test_key_is_deterministic_hex() {
        let a = cache_key("Smith Pier, DE", None);
        let b = cache_key("Smith Pier, DE", None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_context_tag_separates_keys() {
        let untagged = cache_key("Smith Pier", None);
        let tagged = cache_key("Smith Pier", Some("DE_VIEWBOX_US"));
        assert_ne!(untagged, tagged);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GeocodeCache::load(&dir.path().join("geocode_cache.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geocode_cache.json");

        let mut cache = GeocodeCache::load(&path).unwrap();
        cache.insert(cache_key("Smith Pier, DE", None), Some(sample_hit()));
        cache.insert(cache_key("Ghost Flats", None), None);
        cache.save().unwrap();

        let reloaded = GeocodeCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get(&cache_key("Smith Pier, DE", None)),
            Some(&Some(sample_hit()))
        );
        // Confirmed-absent entries survive as explicit nulls
        assert_eq!(reloaded.get(&cache_key("Ghost Flats", None)), Some(&None));
    }

    #[test]
    fn test_cache_file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geocode_cache.json");

        let mut cache = GeocodeCache::load(&path).unwrap();
        cache.insert(cache_key("Smith Pier, DE", None), Some(sample_hit()));
        cache.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'));
        assert!(content.contains("  \""));
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geocode_cache.json");
        fs::write(&path, "not json").unwrap();
        assert!(GeocodeCache::load(&path).is_err());
    }
}
