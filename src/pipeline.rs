//! Per-row assembly of the output feature collection.

use anyhow::{Context, Result};
use geojson::Feature;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::features::site_features;
use crate::geocode::{resolve, GeocodeCache, Geocoder, Resolution, ResolveOptions};
use crate::geometry::{DEFAULT_HALF_LAT, DEFAULT_HALF_LON};
use crate::models::SiteRecord;

/// Per-variant pipeline settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Resolver settings (context tag, query recording)
    pub resolve: ResolveOptions,

    /// Honor hand-entered `lat`/`lon` coordinates, skipping geocoding
    pub manual_overrides: bool,

    /// Placeholder square half-extent, degrees latitude
    pub half_lat: f64,

    /// Placeholder square half-extent, degrees longitude
    pub half_lon: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            manual_overrides: false,
            half_lat: DEFAULT_HALF_LAT,
            half_lon: DEFAULT_HALF_LON,
        }
    }
}

/// Counts reported at the end of a run. `resolved`, `manual`, and
/// `unresolved` partition the input rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub resolved: usize,
    pub manual: usize,
    pub unresolved: usize,
}

/// Assemble the feature pair for every site row, in input order.
///
/// Unresolved sites are skipped with a diagnostic and contribute no
/// features; a geocoder transport failure aborts the run.
pub async fn assemble_features<F>(
    sites: &[SiteRecord],
    geocoder: &dyn Geocoder,
    cache: &mut GeocodeCache,
    options: &RunOptions,
    candidates_for: F,
) -> Result<(Vec<Feature>, RunStats)>
where
    F: Fn(&SiteRecord) -> Vec<String>,
{
    let mut features = Vec::with_capacity(sites.len() * 2);
    let mut stats = RunStats {
        total: sites.len(),
        ..RunStats::default()
    };

    let pb = ProgressBar::new(sites.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    for site in sites {
        pb.inc(1);

        if options.manual_overrides {
            if let Some(center) = site.manual_coords {
                features.extend(site_features(site, center, options.half_lat, options.half_lon));
                stats.manual += 1;
                continue;
            }
        }

        let candidates = candidates_for(site);
        match resolve(geocoder, cache, &candidates, &options.resolve).await {
            Ok(Resolution::Found(hit)) => {
                features.extend(site_features(
                    site,
                    hit.point(),
                    options.half_lat,
                    options.half_lon,
                ));
                stats.resolved += 1;
            }
            Ok(Resolution::NotFound) => {
                warn!("NOT FOUND: {}  |  {}", site.geocode_name, site.site_name);
                stats.unresolved += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Geocoding failed for site '{}'", site.site_name)
                });
            }
        }
    }

    pb.finish_and_clear();
    info!(
        "Sites: {} total, {} resolved, {} manual, {} unresolved",
        stats.total, stats.resolved, stats.manual, stats.unresolved
    );

    Ok((features, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::geocode::{build_candidates, GeocodeError};
    use crate::models::{GeocodeHit, GeoPoint};
    use geojson::JsonValue;

    struct StubGeocoder {
        hits: HashMap<String, (f64, f64)>,
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl StubGeocoder {
        fn new(hits: &[(&str, f64, f64)]) -> Self {
            Self {
                hits: hits
                    .iter()
                    .map(|&(q, lat, lon)| (q.to_string(), (lat, lon)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                hits: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
            if self.fail {
                return Err(GeocodeError::MalformedResponse("stub failure".to_string()));
            }
            self.calls.lock().unwrap().push(query.to_string());
            Ok(self.hits.get(query).map(|&(lat, lon)| GeocodeHit {
                lat,
                lon,
                display_name: format!("{} (stub)", query),
                query_used: None,
            }))
        }
    }

    fn site(zone_id: &str, site_name: &str, geocode_name: &str) -> SiteRecord {
        SiteRecord {
            zone_id: zone_id.to_string(),
            zone_name: "North Bay".to_string(),
            site_name: site_name.to_string(),
            geocode_name: geocode_name.to_string(),
            manual_coords: None,
        }
    }

    fn empty_cache(dir: &tempfile::TempDir) -> GeocodeCache {
        GeocodeCache::load(&dir.path().join("geocode_cache.json")).unwrap()
    }

    fn single_query(site: &SiteRecord) -> Vec<String> {
        vec![format!("{}, Delaware, USA", site.geocode_name)]
    }

    fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a JsonValue> {
        feature.properties.as_ref().unwrap().get(key)
    }

    #[tokio::test]
    async fn test_each_located_site_yields_a_feature_pair() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = empty_cache(&dir);
        let stub = StubGeocoder::new(&[
            ("Smith Pier, Delaware, USA", 39.0, -75.3),
            ("Bowers Beach, Delaware, USA", 39.06, -75.4),
        ]);
        let sites = vec![
            site("Z1", "Smith Landing", "Smith Pier"),
            site("Z2", "Bowers", "Bowers Beach"),
        ];

        let (features, stats) = assemble_features(
            &sites,
            &stub,
            &mut cache,
            &RunOptions::default(),
            single_query,
        )
        .await
        .unwrap();

        assert_eq!(features.len(), 2 * stats.resolved);
        assert_eq!(
            stats,
            RunStats { total: 2, resolved: 2, manual: 0, unresolved: 0 }
        );
        // Input order is preserved: polygon then point, site by site
        assert_eq!(property(&features[0], "zone_id").unwrap(), "Z1");
        assert_eq!(property(&features[1], "zone_id").unwrap(), "Z1");
        assert_eq!(property(&features[1], "feature_type").unwrap(), "site_point");
        assert_eq!(property(&features[2], "zone_id").unwrap(), "Z2");
    }

    #[tokio::test]
    async fn test_unresolved_sites_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = empty_cache(&dir);
        let stub = StubGeocoder::new(&[("Smith Pier, Delaware, USA", 39.0, -75.3)]);
        let sites = vec![
            site("Z1", "Smith Landing", "Smith Pier"),
            site("Z2", "Ghost Landing", "Ghost Flats"),
        ];

        let (features, stats) = assemble_features(
            &sites,
            &stub,
            &mut cache,
            &RunOptions::default(),
            single_query,
        )
        .await
        .unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(
            stats,
            RunStats { total: 2, resolved: 1, manual: 0, unresolved: 1 }
        );
        assert!(features
            .iter()
            .all(|f| property(f, "zone_id").unwrap() == "Z1"));
    }

    #[tokio::test]
    async fn test_manual_coordinates_bypass_cache_and_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = empty_cache(&dir);
        let stub = StubGeocoder::new(&[]);
        let mut manual = site("Z1", "Hand Placed", "Hand Placed");
        manual.manual_coords = Some(GeoPoint { lat: 38.8, lon: -75.1 });
        let sites = vec![manual];

        let options = RunOptions {
            manual_overrides: true,
            ..RunOptions::default()
        };
        let (features, stats) =
            assemble_features(&sites, &stub, &mut cache, &options, single_query)
                .await
                .unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(
            stats,
            RunStats { total: 1, resolved: 0, manual: 1, unresolved: 0 }
        );
        assert!(stub.calls().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_manual_coordinates_ignored_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = empty_cache(&dir);
        let stub = StubGeocoder::new(&[("Hand Placed, Delaware, USA", 39.0, -75.3)]);
        let mut manual = site("Z1", "Hand Placed", "Hand Placed");
        manual.manual_coords = Some(GeoPoint { lat: 38.8, lon: -75.1 });
        let sites = vec![manual];

        let (features, stats) = assemble_features(
            &sites,
            &stub,
            &mut cache,
            &RunOptions::default(),
            single_query,
        )
        .await
        .unwrap();

        assert_eq!(stats.manual, 0);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stub.calls().len(), 1);
        // The geocoded coordinate wins over the hand-entered one
        let geometry = features[1].geometry.as_ref().unwrap();
        match &geometry.value {
            geojson::Value::Point(position) => {
                assert!((position[0] + 75.3).abs() < 1e-9);
                assert!((position[1] - 39.0).abs() < 1e-9);
            }
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = empty_cache(&dir);
        let stub = StubGeocoder::failing();
        let sites = vec![site("Z1", "Smith Landing", "Smith Pier")];

        let result = assemble_features(
            &sites,
            &stub,
            &mut cache,
            &RunOptions::default(),
            single_query,
        )
        .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Smith Landing"));
    }

    #[tokio::test]
    async fn test_fallback_chain_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = empty_cache(&dir);
        // Only the second candidate resolves
        let stub = StubGeocoder::new(&[("Smith Pier, DE", 39.0, -75.3)]);
        let sites = vec![site("Z1", "Smith Landing", "Smith Pier")];

        let options = RunOptions {
            resolve: ResolveOptions {
                context: Some("DE_VIEWBOX_US".to_string()),
                record_query: true,
            },
            manual_overrides: true,
            ..RunOptions::default()
        };
        let vocab = crate::config::CandidateConfig::default();
        let (features, stats) = assemble_features(
            &sites,
            &stub,
            &mut cache,
            &options,
            |site| build_candidates(&site.geocode_name, &site.site_name, &vocab),
        )
        .await
        .unwrap();

        assert_eq!(stub.calls(), vec!["Smith Pier", "Smith Pier, DE"]);
        assert_eq!(
            stats,
            RunStats { total: 1, resolved: 1, manual: 0, unresolved: 0 }
        );

        // Polygon ring corners around (39.0, -75.3)
        let geometry = features[0].geometry.as_ref().unwrap();
        let rings = match &geometry.value {
            geojson::Value::Polygon(rings) => rings,
            other => panic!("expected polygon, got {:?}", other),
        };
        let expected = [
            (-75.315, 38.99),
            (-75.285, 38.99),
            (-75.285, 39.01),
            (-75.315, 39.01),
            (-75.315, 38.99),
        ];
        for (position, (x, y)) in rings[0].iter().zip(expected) {
            assert!((position[0] - x).abs() < 1e-9);
            assert!((position[1] - y).abs() < 1e-9);
        }

        let geometry = features[1].geometry.as_ref().unwrap();
        let position = match &geometry.value {
            geojson::Value::Point(position) => position,
            other => panic!("expected point, got {:?}", other),
        };
        assert!((position[0] + 75.3).abs() < 1e-9);
        assert!((position[1] - 39.0).abs() < 1e-9);

        assert_eq!(property(&features[0], "zone_id").unwrap(), "Z1");
        assert_eq!(property(&features[1], "zone_id").unwrap(), "Z1");
        assert_eq!(property(&features[0], "polygon_id").unwrap(), "A");
        assert_eq!(property(&features[1], "feature_type").unwrap(), "site_point");
    }
}
