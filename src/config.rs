//! Survey run configuration.
//!
//! Every setting has a Delaware-survey default, so a config file only
//! needs to name what it overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Settings for a survey mapping run, loadable from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub geocoder: GeocoderConfig,
    /// Bounded search area applied by the crabbing variant
    pub search_area: SearchArea,
    pub candidates: CandidateConfig,
}

impl SurveyConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: SurveyConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

/// Nominatim client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Search endpoint URL
    pub endpoint: String,

    /// Identifying User-Agent, required by the provider's usage policy
    pub user_agent: String,

    /// Per-request timeout, seconds
    pub timeout_secs: u64,

    /// Pause after every network call, milliseconds
    pub delay_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "shellmap/0.1 (shellfish survey map; https://github.com/example)"
                .to_string(),
            timeout_secs: 30,
            delay_ms: 1100,
        }
    }
}

/// Geographic bounds forwarded to the geocoder so matches stay inside the
/// survey region.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchArea {
    /// ISO country codes for the `countrycodes` parameter
    pub countrycodes: String,

    /// Viewbox corners as left, top, right, bottom
    pub viewbox: [f64; 4],
}

impl Default for SearchArea {
    fn default() -> Self {
        // Delaware bounding box
        Self {
            countrycodes: "us".to_string(),
            viewbox: [-75.8, 39.95, -74.85, 38.35],
        }
    }
}

impl SearchArea {
    /// Comma-joined value for the `viewbox` query parameter.
    pub fn viewbox_param(&self) -> String {
        let [left, top, right, bottom] = self.viewbox;
        format!("{},{},{},{}", left, top, right, bottom)
    }
}

/// Vocabulary for candidate query generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Jurisdiction qualifiers appended to names, most specific first
    pub qualifiers: Vec<String>,

    /// Tokens stripped from names; an overly specific pier or bridge name
    /// can miss where the bare place name matches
    pub noise_tokens: Vec<String>,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            qualifiers: vec!["DE".to_string(), "Delaware".to_string()],
            noise_tokens: vec!["Pier".to_string(), "Bridge".to_string()],
        }
    }
}
