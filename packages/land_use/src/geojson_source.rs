//! `GeoJSON` `FeatureCollection` feature sources.
//!
//! Reads a standard `FeatureCollection` either from a URL or from a local
//! file. Each feature must carry a `landuse` property; features with other
//! values or without geometry are skipped. The collection is filtered to
//! features that come within the search radius of the center.

use std::path::PathBuf;

use async_trait::async_trait;
use geo::Geometry;
use geojson::GeoJson;
use urban_growth_models::LandUse;

use crate::overpass::LANDUSE_TAG;
use crate::{FeatureSource, LandUseError, LandUseFeature, SearchArea};

/// Fetches a `FeatureCollection` from a URL that returns it directly.
pub struct GeojsonUrlSource {
    client: reqwest::Client,
    url: String,
}

impl GeojsonUrlSource {
    /// Creates a source reading from `url`.
    #[must_use]
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl FeatureSource for GeojsonUrlSource {
    fn id(&self) -> &str {
        "geojson_url"
    }

    async fn fetch_features(
        &self,
        area: &SearchArea,
        tags: &[LandUse],
    ) -> Result<Vec<LandUseFeature>, LandUseError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(LandUseError::MalformedResponse {
                message: format!("GeoJSON request failed with status {}", resp.status()),
            });
        }
        let body = resp.text().await?;
        parse_feature_collection(&body, area, tags)
    }
}

/// Reads a `FeatureCollection` from a local file.
pub struct GeojsonFileSource {
    path: PathBuf,
}

impl GeojsonFileSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeatureSource for GeojsonFileSource {
    fn id(&self) -> &str {
        "geojson_file"
    }

    async fn fetch_features(
        &self,
        area: &SearchArea,
        tags: &[LandUse],
    ) -> Result<Vec<LandUseFeature>, LandUseError> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        parse_feature_collection(&body, area, tags)
    }
}

/// Parses a `FeatureCollection`, keeping features tagged with one of `tags`
/// that come within the radius of `area`.
fn parse_feature_collection(
    body: &str,
    area: &SearchArea,
    tags: &[LandUse],
) -> Result<Vec<LandUseFeature>, LandUseError> {
    let geojson: GeoJson = body.parse().map_err(|e| LandUseError::MalformedResponse {
        message: format!("Failed to parse GeoJSON: {e}"),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LandUseError::MalformedResponse {
            message: "GeoJSON is not a FeatureCollection".to_string(),
        });
    };

    let mut features = Vec::new();

    for feature in collection.features {
        let Some(land_use) = feature
            .property(LANDUSE_TAG)
            .and_then(serde_json::Value::as_str)
            .filter(|value| tags.iter().any(|t| t.as_ref() == *value))
            .map(String::from)
        else {
            continue;
        };

        let Some(geometry) = feature.geometry else {
            continue;
        };

        let geometry: Geometry<f64> = match geometry.try_into() {
            Ok(geometry) => geometry,
            Err(e) => {
                log::debug!("Skipping GeoJSON feature with unsupported geometry: {e}");
                continue;
            }
        };

        if area.reaches(&geometry) {
            features.push(LandUseFeature { land_use, geometry });
        }
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> String {
        serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "landuse": "residential" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[78.36, 17.43], [78.38, 17.43], [78.38, 17.45], [78.36, 17.45], [78.36, 17.43]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "landuse": "industrial" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[10.0, 10.0], [10.1, 10.0], [10.1, 10.1], [10.0, 10.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "landuse": "forest" },
                    "geometry": { "type": "Point", "coordinates": [78.37, 17.44] }
                },
                {
                    "type": "Feature",
                    "properties": { "landuse": "commercial" },
                    "geometry": null
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn keeps_tagged_features_inside_the_search_box() {
        let area = SearchArea::new(17.44, 78.37, 10_000.0).unwrap();
        let features = parse_feature_collection(&collection(), &area, LandUse::ALL).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].land_use, "residential");
    }

    #[test]
    fn drops_features_in_the_search_box_corner() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "landuse": "commercial" },
                    "geometry": { "type": "Point", "coordinates": [78.39, 17.45] }
                },
                {
                    "type": "Feature",
                    "properties": { "landuse": "industrial" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[78.455, 17.515], [78.46, 17.515], [78.46, 17.52], [78.455, 17.52], [78.455, 17.515]]]
                    }
                }
            ]
        })
        .to_string();
        let area = SearchArea::new(17.44, 78.37, 10_000.0).unwrap();
        let features = parse_feature_collection(&body, &area, LandUse::ALL).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].land_use, "commercial");
    }

    #[test]
    fn rejects_non_collections() {
        let area = SearchArea::new(0.0, 0.0, 1.0).unwrap();
        let point = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(parse_feature_collection(point, &area, LandUse::ALL).is_err());
        assert!(parse_feature_collection("nope", &area, LandUse::ALL).is_err());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = GeojsonFileSource::new("/nonexistent/land_use.geojson");
        let area = SearchArea::new(17.44, 78.37, 10_000.0).unwrap();
        let err = source.fetch_features(&area, LandUse::ALL).await.unwrap_err();
        assert!(matches!(err, LandUseError::Io(_)));
    }
}
