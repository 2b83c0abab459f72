//! Analyzer configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it
//! overrides:
//!
//! ```toml
//! live_lookup = false
//! area_unit = "square_meters"
//!
//! [feature_source]
//! type = "geojson_file"
//! path = "land_use.geojson"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use urban_growth_land_use::DEFAULT_RADIUS_M;
use urban_growth_land_use::sources::FeatureSourceConfig;
use urban_growth_models::AreaUnit;

use crate::AnalysisError;

/// Configuration for an [`crate::Analyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Whether the live postal lookup service is queried before the
    /// static fallback table.
    pub live_lookup: bool,
    /// Whether placeholder growth metrics are included in the report.
    pub include_growth: bool,
    /// Total timeout for each outbound HTTP request, in seconds.
    pub http_timeout_secs: u64,
    /// Connection timeout for each outbound HTTP request, in seconds.
    pub connect_timeout_secs: u64,
    /// Feature search radius around the location, in metres.
    pub radius_m: f64,
    /// Unit of the reported land-use area.
    pub area_unit: AreaUnit,
    /// Where land-use features are fetched from.
    pub feature_source: FeatureSourceConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            live_lookup: true,
            include_growth: true,
            http_timeout_secs: 10,
            connect_timeout_secs: 5,
            radius_m: DEFAULT_RADIUS_M,
            area_unit: AreaUnit::default(),
            feature_source: FeatureSourceConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Parses a configuration from TOML, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Toml`] if the TOML is malformed and
    /// [`AnalysisError::Config`] if a value is out of bounds.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, AnalysisError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Io`] if the file cannot be read, or any
    /// error from [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Returns the connect timeout, capped at the total request timeout.
    #[must_use]
    pub fn effective_connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs.min(self.http_timeout_secs)
    }

    /// Checks value bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Config`] for a non-positive radius or a
    /// zero timeout.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(AnalysisError::Config {
                message: format!("radius_m must be positive, got {}", self.radius_m),
            });
        }
        if self.http_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(AnalysisError::Config {
                message: "timeouts must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}
