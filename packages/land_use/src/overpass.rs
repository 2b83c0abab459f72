//! `OpenStreetMap` Overpass API feature source.
//!
//! Sends an Overpass QL query for `way` and `relation` elements whose
//! `landuse` tag matches the requested set within `around:radius` of the
//! center, with `out geom;` so every element carries inline coordinates.
//!
//! Ways with closed rings become polygons, open ways become line strings,
//! and multipolygon relations are assembled from their `outer` and `inner`
//! member ways, joining open ways end-to-end into rings. A relation whose
//! outer ways never close is kept as a multi line string with zero area.
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL>

use std::collections::BTreeMap;

use async_trait::async_trait;
use geo::{Contains, Coord, Geometry, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use urban_growth_models::LandUse;

use crate::{FeatureSource, LandUseError, LandUseFeature, SearchArea};

/// OSM tag queried and reported for every feature.
pub const LANDUSE_TAG: &str = "landuse";

/// Overpass API feature source.
pub struct OverpassSource {
    client: reqwest::Client,
    base_url: String,
    query_timeout_secs: u32,
}

impl OverpassSource {
    /// Creates a source posting queries to `base_url` (the `interpreter`
    /// endpoint).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, query_timeout_secs: u32) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            query_timeout_secs,
        }
    }
}

#[async_trait]
impl FeatureSource for OverpassSource {
    fn id(&self) -> &str {
        "overpass"
    }

    async fn fetch_features(
        &self,
        area: &SearchArea,
        tags: &[LandUse],
    ) -> Result<Vec<LandUseFeature>, LandUseError> {
        let query = build_query(area, tags, self.query_timeout_secs);
        log::debug!("Overpass query:\n{query}");

        let resp = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(LandUseError::MalformedResponse {
                message: format!("Overpass request failed with status {}", resp.status()),
            });
        }

        let body = resp.text().await?;
        parse_response(&body, tags)
    }
}

/// Builds the Overpass QL query for `tags` around `area`.
#[must_use]
pub fn build_query(area: &SearchArea, tags: &[LandUse], timeout_secs: u32) -> String {
    let values = tags
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("|");
    let around = format!(
        "around:{},{},{}",
        area.radius_m, area.latitude, area.longitude
    );

    let mut query = format!("[out:json][timeout:{timeout_secs}];\n(\n");
    for element in ["way", "relation"] {
        query.push_str(&format!(
            "  {element}[\"{LANDUSE_TAG}\"~\"^({values})$\"]({around});\n"
        ));
    }
    query.push_str(");\nout geom;");
    query
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: i64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
        #[serde(default)]
        geometry: Vec<Option<LatLon>>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
        #[serde(default)]
        members: Vec<Member>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

fn to_coords(points: &[Option<LatLon>]) -> Vec<Coord<f64>> {
    points
        .iter()
        .flatten()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect()
}

fn is_ring(coords: &[Coord<f64>]) -> bool {
    coords.len() >= 4 && coords.first() == coords.last()
}

fn way_geometry(points: &[Option<LatLon>]) -> Option<Geometry<f64>> {
    let coords = to_coords(points);
    if is_ring(&coords) {
        return Some(Polygon::new(LineString::new(coords), Vec::new()).into());
    }
    (coords.len() >= 2).then(|| LineString::new(coords).into())
}

/// Joins way segments end-to-end into closed rings.
///
/// Segments may run in either direction. Chains that never close are
/// dropped.
fn join_rings(segments: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut rings = Vec::new();
    let mut open = Vec::new();
    for segment in segments {
        if is_ring(&segment) {
            rings.push(LineString::new(segment));
        } else if segment.len() >= 2 {
            open.push(segment);
        }
    }

    while let Some(mut chain) = open.pop() {
        while let Some(&tail) = chain.last() {
            if is_ring(&chain) {
                break;
            }
            let Some(i) = open
                .iter()
                .position(|s| s.first() == Some(&tail) || s.last() == Some(&tail))
            else {
                break;
            };
            let mut next = open.swap_remove(i);
            if next.first() != Some(&tail) {
                next.reverse();
            }
            chain.extend(next.into_iter().skip(1));
        }

        if is_ring(&chain) {
            rings.push(LineString::new(chain));
        } else {
            log::debug!("Dropping unclosed relation ring of {} points", chain.len());
        }
    }

    rings
}

fn relation_geometry(members: &[Member]) -> Option<Geometry<f64>> {
    let ways: Vec<&Member> = members.iter().filter(|m| m.kind == "way").collect();

    let mut outer_segments = Vec::new();
    let mut inner_segments = Vec::new();
    for member in &ways {
        let coords = to_coords(&member.geometry);
        if member.role == "inner" {
            inner_segments.push(coords);
        } else {
            outer_segments.push(coords);
        }
    }

    let mut outers: Vec<Polygon<f64>> = join_rings(outer_segments)
        .into_iter()
        .map(|ring| Polygon::new(ring, Vec::new()))
        .collect();

    if outers.is_empty() {
        // Still a returned feature; keep its outline without area.
        let lines: Vec<LineString<f64>> = ways
            .iter()
            .map(|m| to_coords(&m.geometry))
            .filter(|coords| coords.len() >= 2)
            .map(LineString::new)
            .collect();
        return (!lines.is_empty()).then(|| MultiLineString::new(lines).into());
    }

    for inner in join_rings(inner_segments) {
        let Some(&first) = inner.0.first() else {
            continue;
        };
        if let Some(outer) = outers.iter_mut().find(|p| p.contains(&Point::from(first))) {
            outer.interiors_push(inner);
        }
    }

    Some(MultiPolygon::new(outers).into())
}

/// Parses an Overpass JSON response, keeping elements tagged with one of
/// `tags`.
fn parse_response(body: &str, tags: &[LandUse]) -> Result<Vec<LandUseFeature>, LandUseError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| LandUseError::MalformedResponse {
            message: format!("Failed to parse Overpass response: {e}"),
        })?;

    if let Some(remark) = &response.remark {
        if response.elements.is_empty() {
            return Err(LandUseError::MalformedResponse {
                message: format!("Overpass remark: {remark}"),
            });
        }
        log::warn!("Overpass remark (partial result): {remark}");
    }

    let mut features = Vec::with_capacity(response.elements.len());

    for element in &response.elements {
        let (id, element_tags, geometry) = match element {
            Element::Node { id, lat, lon, tags } => {
                (*id, tags, Some(Geometry::Point(Point::new(*lon, *lat))))
            }
            Element::Way { id, tags, geometry } => (*id, tags, way_geometry(geometry)),
            Element::Relation { id, tags, members } => (*id, tags, relation_geometry(members)),
            Element::Other => continue,
        };

        let Some(land_use) = element_tags
            .get(LANDUSE_TAG)
            .filter(|value| tags.iter().any(|t| t.as_ref() == value.as_str()))
        else {
            continue;
        };

        let Some(geometry) = geometry else {
            log::debug!("Skipping Overpass element {id}: no usable geometry");
            continue;
        };

        features.push(LandUseFeature {
            land_use: land_use.clone(),
            geometry,
        });
    }

    Ok(features)
}
