#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for the urban growth analysis pipeline.
//!
//! Each stage of the pipeline owns the type it produces and hands it by
//! value to the next stage:
//!
//! 1. [`PostalCode`] is the sole analysis key.
//! 2. [`Location`] is produced by the coordinate resolver.
//! 3. [`UrbanAreaSummary`] is produced by the land-use feature aggregator.
//! 4. [`GrowthMetrics`] is produced by the (placeholder) growth estimator.
//! 5. [`Report`] composes all of the above into one fixed schema.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// District/state placeholder used when the source does not provide one.
pub const UNKNOWN: &str = "Unknown";

/// Error returned when constructing a [`PostalCode`] from an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("postal code must not be empty")]
pub struct InvalidPostalCode;

/// A postal code used verbatim as the lookup key.
///
/// No validation is performed beyond requiring a non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Creates a postal code from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPostalCode`] if `code` is empty.
    pub fn new(code: impl Into<String>) -> Result<Self, InvalidPostalCode> {
        let code = code.into();
        if code.is_empty() {
            return Err(InvalidPostalCode);
        }
        Ok(Self(code))
    }

    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = InvalidPostalCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for PostalCode {
    type Err = InvalidPostalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error returned when coordinates fall outside the WGS84 ranges.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinates {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

/// Returns `true` if `latitude` is in [-90, 90] and `longitude` in [-180, 180].
#[must_use]
pub fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// A resolved postal code location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationFields")]
pub struct Location {
    /// Administrative district, or [`UNKNOWN`].
    pub district: String,
    /// State, or [`UNKNOWN`].
    pub state: String,
    /// Latitude (WGS84), in [-90, 90].
    pub latitude: f64,
    /// Longitude (WGS84), in [-180, 180].
    pub longitude: f64,
}

#[derive(Deserialize)]
struct LocationFields {
    district: String,
    state: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<LocationFields> for Location {
    type Error = InvalidCoordinates;

    fn try_from(fields: LocationFields) -> Result<Self, Self::Error> {
        Self::new(fields.district, fields.state, fields.latitude, fields.longitude)
    }
}

impl Location {
    /// Creates a location, rejecting out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinates`] if either coordinate is out of range
    /// or not finite.
    pub fn new(
        district: impl Into<String>,
        state: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, InvalidCoordinates> {
        if !coordinates_in_range(latitude, longitude) {
            return Err(InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            district: district.into(),
            state: state.into(),
            latitude,
            longitude,
        })
    }

    /// Creates a location whose district and state are [`UNKNOWN`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinates`] if either coordinate is out of range.
    pub fn unknown(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        Self::new(UNKNOWN, UNKNOWN, latitude, longitude)
    }
}

/// The land-use categories queried from the feature source.
///
/// String forms match the `OpenStreetMap` `landuse` tag values.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LandUse {
    /// Housing.
    Residential,
    /// Offices, retail, and services.
    Commercial,
    /// Factories, warehouses, and works.
    Industrial,
}

impl LandUse {
    /// The fixed tag set used to filter land-use features.
    pub const ALL: &[Self] = &[Self::Residential, Self::Commercial, Self::Industrial];
}

/// Unit of [`UrbanAreaSummary::total_area`].
///
/// The default is [`AreaUnit::SquareDegrees`]: planar area computed directly
/// on unprojected longitude/latitude coordinates. It is not a physical area
/// measurement, and its value shrinks with latitude.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AreaUnit {
    /// Planar area of raw lon/lat coordinates.
    #[default]
    SquareDegrees,
    /// Approximate spherical area (Chamberlain-Duquette) in square metres.
    SquareMeters,
}

/// Aggregate statistics of the land-use features around a location.
///
/// Invariant: `feature_count == 0` implies `total_area == 0.0` and an empty
/// `feature_types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrbanAreaSummary {
    /// Sum of per-feature areas, in [`Self::area_unit`].
    pub total_area: f64,
    /// Number of features returned by the source.
    pub feature_count: u64,
    /// Distinct land-use tag values present among the features.
    pub feature_types: BTreeSet<String>,
    /// Unit of `total_area`.
    pub area_unit: AreaUnit,
}

impl UrbanAreaSummary {
    /// The zero summary reported when no features are available.
    #[must_use]
    pub const fn zero(area_unit: AreaUnit) -> Self {
        Self {
            total_area: 0.0,
            feature_count: 0,
            feature_types: BTreeSet::new(),
            area_unit,
        }
    }

    /// Returns `true` if this summary carries no features.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.feature_count == 0
    }
}

impl Default for UrbanAreaSummary {
    fn default() -> Self {
        Self::zero(AreaUnit::default())
    }
}

/// Placeholder urban growth indicators.
///
/// **Non-authoritative.** These values are random draws from fixed plausible
/// ranges and are not derived from any imagery or census data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// People per square kilometre, in [500, 5000].
    pub population_density: f64,
    /// Share of built-up land, in [30, 70] percent.
    pub built_up_percentage: f64,
    /// Annual expansion rate, in [1.5, 5.0] percent.
    pub expansion_rate: f64,
}

/// The full analysis report for one postal code.
///
/// Every field is always present. A failed resolution serializes
/// `location` as `{}`, and the zero summary is reported when no features
/// were retrieved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The analysed postal code.
    pub postal_code: PostalCode,
    /// The resolved location, if any.
    #[serde(serialize_with = "serialize_location")]
    pub location: Option<Location>,
    /// Land-use summary around the location.
    pub urban_area: UrbanAreaSummary,
    /// Placeholder growth indicators; `null` when estimation is disabled.
    pub urban_growth: Option<GrowthMetrics>,
}

#[allow(clippy::ref_option)]
fn serialize_location<S: Serializer>(
    location: &Option<Location>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match location {
        Some(location) => location.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_postal_code() {
        assert_eq!(PostalCode::new(""), Err(InvalidPostalCode));
        assert_eq!(PostalCode::new("500055").unwrap().as_str(), "500055");
    }

    #[test]
    fn postal_code_is_used_verbatim() {
        let code: PostalCode = " 110001 ".parse().unwrap();
        assert_eq!(code.as_str(), " 110001 ");
    }

    #[test]
    fn location_rejects_out_of_range_coordinates() {
        assert!(Location::unknown(91.0, 0.0).is_err());
        assert!(Location::unknown(0.0, -180.5).is_err());
        assert!(Location::unknown(f64::NAN, 0.0).is_err());
        assert!(Location::unknown(-90.0, 180.0).is_ok());
    }

    #[test]
    fn deserialization_keeps_constructor_checks() {
        let code: PostalCode = serde_json::from_str("\"500055\"").unwrap();
        assert_eq!(code.as_str(), "500055");
        assert!(serde_json::from_str::<PostalCode>("\"\"").is_err());

        let location: Location = serde_json::from_value(serde_json::json!({
            "district": "Hyderabad",
            "state": "Telangana",
            "latitude": 17.44,
            "longitude": 78.37,
        }))
        .unwrap();
        assert_eq!(location, Location::new("Hyderabad", "Telangana", 17.44, 78.37).unwrap());

        let out_of_range = serde_json::json!({
            "district": "Nowhere",
            "state": "Nowhere",
            "latitude": 123.0,
            "longitude": 0.0,
        });
        assert!(serde_json::from_value::<Location>(out_of_range).is_err());
    }

    #[test]
    fn land_use_string_forms_match_osm_tags() {
        let tags: Vec<&str> = LandUse::ALL.iter().map(AsRef::as_ref).collect();
        assert_eq!(tags, ["residential", "commercial", "industrial"]);
        assert_eq!("industrial".parse::<LandUse>().unwrap(), LandUse::Industrial);
    }

    #[test]
    fn zero_summary_is_empty() {
        let zero = UrbanAreaSummary::zero(AreaUnit::SquareMeters);
        assert!(zero.is_empty());
        assert!(zero.total_area.abs() < f64::EPSILON);
        assert!(zero.feature_types.is_empty());
    }

    #[test]
    fn missing_location_serializes_as_empty_object() {
        let report = Report {
            postal_code: PostalCode::new("999999").unwrap(),
            location: None,
            urban_area: UrbanAreaSummary::default(),
            urban_growth: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["location"], serde_json::json!({}));
        assert_eq!(json["urban_growth"], serde_json::Value::Null);
        assert_eq!(
            json["urban_area"],
            serde_json::json!({
                "total_area": 0.0,
                "feature_count": 0,
                "feature_types": [],
                "area_unit": "square_degrees",
            })
        );
        assert_eq!(json["postal_code"], "999999");
    }
}
