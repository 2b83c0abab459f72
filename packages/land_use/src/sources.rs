//! Feature source configuration.
//!
//! The default source is embedded at compile time from
//! `sources/overpass.toml`. Alternative sources can be selected by the
//! analyzer configuration using the same tagged schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::FeatureSource;
use crate::geojson_source::{GeojsonFileSource, GeojsonUrlSource};
use crate::overpass::OverpassSource;

/// How to fetch land-use features, tagged by `type` in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureSourceConfig {
    /// Overpass API `interpreter` endpoint.
    Overpass {
        /// Endpoint URL (e.g., `"https://overpass-api.de/api/interpreter"`).
        base_url: String,
        /// Server-side query timeout passed in the `[timeout:N]` setting.
        #[serde(default = "default_query_timeout")]
        query_timeout_secs: u32,
    },
    /// URL returning a `GeoJSON` `FeatureCollection`.
    GeojsonUrl {
        /// Full URL of the collection.
        url: String,
    },
    /// Local `GeoJSON` `FeatureCollection` file.
    GeojsonFile {
        /// Path to the file.
        path: PathBuf,
    },
}

const fn default_query_timeout() -> u32 {
    25
}

const DEFAULT_SOURCE_TOML: &str = include_str!("../sources/overpass.toml");

/// Returns the embedded default source configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn default_source() -> FeatureSourceConfig {
    toml::de::from_str(DEFAULT_SOURCE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse default feature source: {e}"))
}

impl Default for FeatureSourceConfig {
    fn default() -> Self {
        default_source()
    }
}

impl FeatureSourceConfig {
    /// Instantiates the configured source.
    #[must_use]
    pub fn build(&self, client: &reqwest::Client) -> Box<dyn FeatureSource> {
        match self {
            Self::Overpass {
                base_url,
                query_timeout_secs,
            } => Box::new(OverpassSource::new(
                client.clone(),
                base_url,
                *query_timeout_secs,
            )),
            Self::GeojsonUrl { url } => Box::new(GeojsonUrlSource::new(client.clone(), url)),
            Self::GeojsonFile { path } => Box::new(GeojsonFileSource::new(path.clone())),
        }
    }
}
