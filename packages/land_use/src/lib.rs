#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Land-use feature retrieval and aggregation.
//!
//! Queries a [`FeatureSource`] for residential, commercial, and industrial
//! land-use features within a fixed radius of a location and reduces them
//! to an [`UrbanAreaSummary`]. Sources are selected by a tagged
//! [`sources::FeatureSourceConfig`]:
//!
//! - **Overpass**: `OpenStreetMap` Overpass API (default).
//! - **GeoJSON URL / file**: a `FeatureCollection` with a `landuse`
//!   property on each feature.
//!
//! [`FeatureAggregator::aggregate`] is total: every failure (missing or
//! invalid location, network fault, malformed response, empty result)
//! reduces to the zero summary and is reported only through the log.

pub mod geojson_source;
pub mod overpass;
pub mod sources;

use std::collections::BTreeSet;

use async_trait::async_trait;
use geo::{
    Area, ChamberlainDuquetteArea, Closest, ClosestPoint, Distance, Geometry, Haversine, Intersects,
    Point,
};
use thiserror::Error;
use urban_growth_models::{AreaUnit, LandUse, Location, UrbanAreaSummary, coordinates_in_range};

/// Default search radius around the location, in metres.
pub const DEFAULT_RADIUS_M: f64 = 10_000.0;

/// Metres per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Errors that can occur while retrieving land-use features.
#[derive(Debug, Error)]
pub enum LandUseError {
    /// HTTP request failed or timed out.
    #[error("Network fault: {0}")]
    NetworkFault(#[from] reqwest::Error),

    /// Reading a local feature file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source answered with an unexpected shape or type.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Description of what went wrong.
        message: String,
    },

    /// No location was available to search around.
    #[error("No location to search around")]
    MissingLocation,

    /// The search center or radius is not usable.
    #[error("Invalid search area: latitude {latitude}, longitude {longitude}, radius {radius_m} m")]
    InvalidSearchArea {
        /// Requested latitude.
        latitude: f64,
        /// Requested longitude.
        longitude: f64,
        /// Requested radius in metres.
        radius_m: f64,
    },

    /// The query succeeded but returned no features.
    #[error("Feature query returned no features")]
    EmptyFeatureSet,
}

/// A circular search area around a WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Radius in metres.
    pub radius_m: f64,
}

impl SearchArea {
    /// Creates a search area, validating the center and radius.
    ///
    /// # Errors
    ///
    /// Returns [`LandUseError::InvalidSearchArea`] if the coordinates are
    /// out of range or the radius is not a positive finite number.
    pub fn new(latitude: f64, longitude: f64, radius_m: f64) -> Result<Self, LandUseError> {
        if !coordinates_in_range(latitude, longitude) || !radius_m.is_finite() || radius_m <= 0.0
        {
            return Err(LandUseError::InvalidSearchArea {
                latitude,
                longitude,
                radius_m,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            radius_m,
        })
    }

    /// Returns the center as a lon/lat point.
    #[must_use]
    pub fn center(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Returns `true` if any part of `geometry` lies within the radius.
    ///
    /// The bounding box is checked first. The nearest point is then found
    /// in lon/lat space and its haversine distance to the center compared
    /// against the radius.
    #[must_use]
    pub fn reaches(&self, geometry: &Geometry<f64>) -> bool {
        if !geometry.intersects(&self.bounding_rect()) {
            return false;
        }
        let center = self.center();
        match geometry.closest_point(&center) {
            Closest::Intersection(nearest) | Closest::SinglePoint(nearest) => {
                Haversine.distance(center, nearest) <= self.radius_m
            }
            Closest::Indeterminate => false,
        }
    }

    /// Returns the lon/lat bounding box enclosing the search circle.
    #[must_use]
    pub fn bounding_rect(&self) -> geo::Rect<f64> {
        let dlat = self.radius_m / METERS_PER_DEGREE;
        let cos_lat = self.latitude.to_radians().cos();
        let dlon = if cos_lat > f64::EPSILON {
            (self.radius_m / (METERS_PER_DEGREE * cos_lat)).min(180.0)
        } else {
            180.0
        };

        geo::Rect::new(
            geo::coord! {
                x: (self.longitude - dlon).max(-180.0),
                y: (self.latitude - dlat).max(-90.0),
            },
            geo::coord! {
                x: (self.longitude + dlon).min(180.0),
                y: (self.latitude + dlat).min(90.0),
            },
        )
    }
}

/// A single land-use feature returned by a [`FeatureSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct LandUseFeature {
    /// Value of the feature's `landuse` tag.
    pub land_use: String,
    /// Feature geometry in lon/lat coordinates.
    pub geometry: Geometry<f64>,
}

/// A geospatial source of land-use features.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g., `"overpass"`).
    fn id(&self) -> &str;

    /// Fetches features inside `area` whose `landuse` tag is in `tags`.
    ///
    /// # Errors
    ///
    /// Returns [`LandUseError`] if the request fails or the response cannot
    /// be parsed.
    async fn fetch_features(
        &self,
        area: &SearchArea,
        tags: &[LandUse],
    ) -> Result<Vec<LandUseFeature>, LandUseError>;
}

/// Returns the area of `geometry` in `unit`.
///
/// Only polygonal geometries have a non-zero area. Square degrees are
/// computed on the raw lon/lat coordinates without projection.
#[must_use]
pub fn feature_area(geometry: &Geometry<f64>, unit: AreaUnit) -> f64 {
    let area = match unit {
        AreaUnit::SquareDegrees => geometry.unsigned_area(),
        AreaUnit::SquareMeters => match geometry {
            Geometry::Polygon(polygon) => polygon.chamberlain_duquette_unsigned_area(),
            Geometry::MultiPolygon(multi) => multi.chamberlain_duquette_unsigned_area(),
            Geometry::Rect(rect) => rect.to_polygon().chamberlain_duquette_unsigned_area(),
            _ => 0.0,
        },
    };

    if area.is_finite() { area } else { 0.0 }
}

/// Reduces a feature collection to summary statistics.
#[must_use]
pub fn summarize(features: &[LandUseFeature], unit: AreaUnit) -> UrbanAreaSummary {
    if features.is_empty() {
        return UrbanAreaSummary::zero(unit);
    }

    let total_area = features
        .iter()
        .map(|f| feature_area(&f.geometry, unit))
        .sum();
    let feature_types: BTreeSet<String> = features.iter().map(|f| f.land_use.clone()).collect();

    UrbanAreaSummary {
        total_area,
        feature_count: features.len() as u64,
        feature_types,
        area_unit: unit,
    }
}

/// Retrieves and summarizes land-use features around locations.
pub struct FeatureAggregator {
    source: Box<dyn FeatureSource>,
    radius_m: f64,
    area_unit: AreaUnit,
}

impl FeatureAggregator {
    /// Creates an aggregator over `source`.
    #[must_use]
    pub fn new(source: Box<dyn FeatureSource>, radius_m: f64, area_unit: AreaUnit) -> Self {
        Self {
            source,
            radius_m,
            area_unit,
        }
    }

    /// Returns the unit reported in every summary.
    #[must_use]
    pub const fn area_unit(&self) -> AreaUnit {
        self.area_unit
    }

    /// Summarizes the features around `location`, never failing.
    ///
    /// Any error from [`Self::try_aggregate`] is logged and replaced with
    /// the zero summary.
    pub async fn aggregate(&self, location: Option<&Location>) -> UrbanAreaSummary {
        match self.try_aggregate(location).await {
            Ok(summary) => {
                log::info!(
                    "Summarized {} land-use features from {} ({} {})",
                    summary.feature_count,
                    self.source.id(),
                    summary.total_area,
                    summary.area_unit
                );
                summary
            }
            Err(LandUseError::EmptyFeatureSet) => {
                log::info!("No land-use features found via {}", self.source.id());
                UrbanAreaSummary::zero(self.area_unit)
            }
            Err(e) => {
                log::warn!("Land-use aggregation via {} failed: {e}", self.source.id());
                UrbanAreaSummary::zero(self.area_unit)
            }
        }
    }

    /// Summarizes the features around `location`, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns [`LandUseError::MissingLocation`] without a location,
    /// [`LandUseError::InvalidSearchArea`] for out-of-range coordinates,
    /// [`LandUseError::EmptyFeatureSet`] when nothing was found, and any
    /// source error as-is.
    pub async fn try_aggregate(
        &self,
        location: Option<&Location>,
    ) -> Result<UrbanAreaSummary, LandUseError> {
        let location = location.ok_or(LandUseError::MissingLocation)?;
        let area = SearchArea::new(location.latitude, location.longitude, self.radius_m)?;

        let features = self.source.fetch_features(&area, LandUse::ALL).await?;
        if features.is_empty() {
            return Err(LandUseError::EmptyFeatureSet);
        }

        Ok(summarize(&features, self.area_unit))
    }
}
