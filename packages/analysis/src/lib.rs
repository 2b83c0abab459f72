#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Urban growth report builder.
//!
//! Runs the analysis pipeline for one postal code:
//!
//! 1. resolve the postal code to a location ([`urban_growth_geocoder`]),
//! 2. summarize land-use features around it ([`urban_growth_land_use`]),
//! 3. draw placeholder growth metrics ([`growth`]),
//!
//! and composes the results into a [`Report`]. Each stage's output is a
//! plain return value threaded into the next stage; an [`Analyzer`] holds
//! no per-analysis state and can be reused for any number of codes.
//!
//! [`Analyzer::build`] never fails. A failed stage is represented in the
//! report by an empty location or the zero summary, and its diagnostics
//! go to the log.

pub mod config;
pub mod growth;

use std::time::Duration;

use thiserror::Error;
use urban_growth_geocoder::{ResolverChain, service_registry};
use urban_growth_land_use::FeatureAggregator;
use urban_growth_models::{PostalCode, Report};

pub use config::AnalyzerConfig;

/// Errors that can occur while constructing an [`Analyzer`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// Configuration TOML could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Builds an HTTP client with the configured timeouts.
///
/// The connect timeout is capped at the total request timeout.
///
/// # Errors
///
/// Returns [`AnalysisError::Http`] if the TLS backend fails to initialize.
pub fn http_client(config: &AnalyzerConfig) -> Result<reqwest::Client, AnalysisError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .connect_timeout(Duration::from_secs(
            config.effective_connect_timeout_secs(),
        ))
        .build()?)
}

/// Runs the resolution, aggregation, and estimation stages for postal codes.
pub struct Analyzer {
    resolver: ResolverChain,
    aggregator: FeatureAggregator,
    include_growth: bool,
}

impl Analyzer {
    /// Creates an analyzer from already-built stages.
    #[must_use]
    pub const fn new(
        resolver: ResolverChain,
        aggregator: FeatureAggregator,
        include_growth: bool,
    ) -> Self {
        Self {
            resolver,
            aggregator,
            include_growth,
        }
    }

    /// Creates an analyzer from configuration.
    ///
    /// Resolver strategies come from the embedded service registry, in
    /// priority order. Live strategies are dropped when
    /// [`AnalyzerConfig::live_lookup`] is off.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let client = http_client(config)?;

        let services: Vec<_> = service_registry::enabled_services()
            .into_iter()
            .filter(|svc| config.live_lookup || !svc.is_live())
            .collect();
        let resolver = ResolverChain::from_services(&services, &client);
        log::debug!("Resolver chain: {:?}", resolver.ids());

        let aggregator = FeatureAggregator::new(
            config.feature_source.build(&client),
            config.radius_m,
            config.area_unit,
        );

        Ok(Self::new(resolver, aggregator, config.include_growth))
    }

    /// Returns the resolver chain.
    #[must_use]
    pub const fn resolver(&self) -> &ResolverChain {
        &self.resolver
    }

    /// Builds the report for `postal_code`.
    ///
    /// Always returns a fully shaped report. `urban_growth` carries
    /// non-authoritative placeholder values (see [`growth`]) and is `None`
    /// only when growth estimation is disabled.
    pub async fn build(&self, postal_code: &PostalCode) -> Report {
        log::info!("Analyzing postal code {postal_code}");

        let location = match self.resolver.resolve(postal_code).await {
            Ok(location) => Some(location),
            Err(e) => {
                log::warn!("{e}; continuing with an empty location");
                None
            }
        };

        let urban_area = self.aggregator.aggregate(location.as_ref()).await;
        let urban_growth = self.include_growth.then(growth::estimate);

        Report {
            postal_code: postal_code.clone(),
            location,
            urban_area,
            urban_growth,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use urban_growth_geocoder::static_table::StaticTableResolver;
    use urban_growth_geocoder::{GeocodeError, LocationResolver};
    use urban_growth_land_use::sources::FeatureSourceConfig;
    use urban_growth_land_use::{
        DEFAULT_RADIUS_M, FeatureSource, LandUseError, LandUseFeature, SearchArea,
    };
    use urban_growth_models::{AreaUnit, LandUse, Location, UrbanAreaSummary};

    use super::*;

    struct OfflineLookup;

    #[async_trait]
    impl LocationResolver for OfflineLookup {
        fn id(&self) -> &str {
            "offline"
        }

        async fn resolve(&self, _: &PostalCode) -> Result<Option<Location>, GeocodeError> {
            Err(GeocodeError::MalformedResponse {
                message: "live lookup disabled".to_string(),
            })
        }
    }

    struct FixedLookup(Location);

    #[async_trait]
    impl LocationResolver for FixedLookup {
        fn id(&self) -> &str {
            "fixed"
        }

        async fn resolve(&self, _: &PostalCode) -> Result<Option<Location>, GeocodeError> {
            Ok(Some(self.0.clone()))
        }
    }

    struct NoFeatures;

    #[async_trait]
    impl FeatureSource for NoFeatures {
        fn id(&self) -> &str {
            "none"
        }

        async fn fetch_features(
            &self,
            _: &SearchArea,
            _: &[LandUse],
        ) -> Result<Vec<LandUseFeature>, LandUseError> {
            Ok(Vec::new())
        }
    }

    struct FixedFeatures;

    #[async_trait]
    impl FeatureSource for FixedFeatures {
        fn id(&self) -> &str {
            "fixed"
        }

        async fn fetch_features(
            &self,
            area: &SearchArea,
            _: &[LandUse],
        ) -> Result<Vec<LandUseFeature>, LandUseError> {
            Ok(vec![LandUseFeature {
                land_use: "residential".to_string(),
                geometry: area.bounding_rect().to_polygon().into(),
            }])
        }
    }

    fn code(s: &str) -> PostalCode {
        PostalCode::new(s).unwrap()
    }

    fn offline_analyzer(source: impl FeatureSource + 'static) -> Analyzer {
        Analyzer::new(
            ResolverChain::new(vec![Box::new(OfflineLookup), Box::new(StaticTableResolver)]),
            FeatureAggregator::new(Box::new(source), DEFAULT_RADIUS_M, AreaUnit::SquareDegrees),
            true,
        )
    }

    #[tokio::test]
    async fn fallback_code_produces_a_fully_shaped_report() {
        let report = offline_analyzer(NoFeatures).build(&code("500055")).await;

        assert_eq!(report.location, Some(Location::unknown(17.44, 78.37).unwrap()));
        assert_eq!(
            report.urban_area,
            UrbanAreaSummary::zero(AreaUnit::SquareDegrees)
        );
        assert!(report.urban_growth.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["location"],
            serde_json::json!({
                "district": "Unknown",
                "state": "Unknown",
                "latitude": 17.44,
                "longitude": 78.37,
            })
        );
        assert!(json["urban_growth"]["population_density"].is_number());
    }

    #[tokio::test]
    async fn unresolved_code_still_produces_a_report() {
        let report = offline_analyzer(FixedFeatures).build(&code("000000")).await;

        assert_eq!(report.postal_code.as_str(), "000000");
        assert!(report.location.is_none());
        assert!(report.urban_area.is_empty());
        assert!(report.urban_growth.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["location"], serde_json::json!({}));
        assert_eq!(json["urban_area"]["feature_count"], 0);
    }

    #[tokio::test]
    async fn repeated_builds_agree_on_location_and_area() {
        let live = Location::new("Hyderabad", "Telangana", 17.45, 78.36).unwrap();
        let analyzer = Analyzer::new(
            ResolverChain::new(vec![Box::new(FixedLookup(live.clone()))]),
            FeatureAggregator::new(
                Box::new(FixedFeatures),
                DEFAULT_RADIUS_M,
                AreaUnit::SquareDegrees,
            ),
            true,
        );

        let first = analyzer.build(&code("500055")).await;
        let second = analyzer.build(&code("500055")).await;

        assert_eq!(first.location, Some(live));
        assert_eq!(first.location, second.location);
        assert_eq!(first.urban_area, second.urban_area);
        assert_eq!(first.urban_area.feature_count, 1);
    }

    #[tokio::test]
    async fn growth_can_be_disabled() {
        let analyzer = Analyzer::new(
            ResolverChain::new(vec![Box::new(StaticTableResolver)]),
            FeatureAggregator::new(
                Box::new(NoFeatures),
                DEFAULT_RADIUS_M,
                AreaUnit::SquareDegrees,
            ),
            false,
        );
        let report = analyzer.build(&code("110001")).await;
        assert!(report.urban_growth.is_none());
        assert!(report.location.is_some());
    }

    #[test]
    fn live_lookup_off_keeps_only_the_static_table() {
        let config = AnalyzerConfig {
            live_lookup: false,
            ..AnalyzerConfig::default()
        };
        let analyzer = Analyzer::from_config(&config).unwrap();
        assert_eq!(analyzer.resolver().ids(), ["static_table"]);

        let analyzer = Analyzer::from_config(&AnalyzerConfig::default()).unwrap();
        assert_eq!(analyzer.resolver().ids(), ["postal_lookup", "static_table"]);
    }

    #[tokio::test]
    async fn offline_config_with_local_features() {
        let config = AnalyzerConfig {
            live_lookup: false,
            feature_source: FeatureSourceConfig::GeojsonFile {
                path: concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/hyderabad_land_use.geojson")
                    .into(),
            },
            ..AnalyzerConfig::default()
        };
        let report = Analyzer::from_config(&config)
            .unwrap()
            .build(&code("500055"))
            .await;

        assert_eq!(report.urban_area.feature_count, 3);
        assert!((report.urban_area.total_area - 0.0006).abs() < 1e-9);
        assert_eq!(
            report
                .urban_area
                .feature_types
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            ["commercial", "industrial", "residential"]
        );
    }
}
