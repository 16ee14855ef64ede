//! Nominatim search client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::{GeocoderConfig, SearchArea};
use crate::models::GeocodeHit;

/// Errors from a geocoder lookup. Transport failures are not retried;
/// callers treat them as fatal to the run.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid geocoder endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("malformed geocoder response: {0}")]
    MalformedResponse(String),
}

/// A single-query lookup against some geocoding provider.
///
/// `Ok(None)` means the provider found no match, which is a normal
/// outcome, not an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// HTTP client for the Nominatim `/search` endpoint.
///
/// Sends one request per lookup, limited to the single best match, and
/// pauses after every response per the provider's shared-use policy.
#[derive(Debug)]
pub struct NominatimClient {
    client: Client,
    endpoint: Url,
    area: Option<SearchArea>,
    delay: Duration,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig, area: Option<SearchArea>) -> Result<Self, GeocodeError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            area,
            delay: Duration::from_millis(config.delay_ms),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")]);

        if let Some(area) = &self.area {
            let viewbox = area.viewbox_param();
            request = request.query(&[
                ("countrycodes", area.countrycodes.as_str()),
                ("viewbox", viewbox.as_str()),
                ("bounded", "1"),
            ]);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::MalformedResponse(e.to_string()))?;

        // Pause after every network call to stay within Nominatim's
        // shared-use policy. Cache hits never reach this point.
        tokio::time::sleep(self.delay).await;

        let place = match places.into_iter().next() {
            Some(place) => place,
            None => {
                debug!("No geocoder match for '{}'", query);
                return Ok(None);
            }
        };

        let lat = place.lat.parse::<f64>().map_err(|_| {
            GeocodeError::MalformedResponse(format!("unparseable lat '{}'", place.lat))
        })?;
        let lon = place.lon.parse::<f64>().map_err(|_| {
            GeocodeError::MalformedResponse(format!("unparseable lon '{}'", place.lon))
        })?;

        Ok(Some(GeocodeHit {
            lat,
            lon,
            display_name: place.display_name,
            query_used: None,
        }))
    }
}
