//! Postal lookup service client.
//!
//! Issues a single `GET` against a templated URL (the `{postal_code}`
//! placeholder is replaced with the code verbatim) and decodes the
//! response through a strict schema:
//!
//! ```json
//! [{
//!   "Status": "Success",
//!   "PostOffice": [
//!     { "District": "Hyderabad", "State": "Telangana",
//!       "Latitude": "17.4401", "Longitude": "78.3489" }
//!   ]
//! }]
//! ```
//!
//! See <https://api.postalpincode.in/>

use async_trait::async_trait;
use serde::Deserialize;
use urban_growth_models::{Location, PostalCode, UNKNOWN};

use crate::{GeocodeError, LocationResolver};

/// Placeholder substituted with the postal code in the URL template.
pub const POSTAL_CODE_PLACEHOLDER: &str = "{postal_code}";

/// Live postal lookup strategy.
pub struct PostalLookupResolver {
    client: reqwest::Client,
    url_template: String,
}

impl PostalLookupResolver {
    /// Creates a resolver using `client` and a URL template containing
    /// [`POSTAL_CODE_PLACEHOLDER`].
    #[must_use]
    pub fn new(client: reqwest::Client, url_template: &str) -> Self {
        Self {
            client,
            url_template: url_template.to_string(),
        }
    }

    /// Returns the request URL for `postal_code`.
    #[must_use]
    pub fn url_for(&self, postal_code: &PostalCode) -> String {
        self.url_template
            .replace(POSTAL_CODE_PLACEHOLDER, postal_code.as_str())
    }
}

#[async_trait]
impl LocationResolver for PostalLookupResolver {
    fn id(&self) -> &str {
        "postal_lookup"
    }

    async fn resolve(&self, postal_code: &PostalCode) -> Result<Option<Location>, GeocodeError> {
        lookup(&self.client, &self.url_for(postal_code)).await
    }
}

/// Fetches and parses a single postal lookup response.
///
/// # Errors
///
/// Returns [`GeocodeError::NetworkFault`] if the request fails or times
/// out, and [`GeocodeError::MalformedResponse`] for non-success statuses or
/// bodies that do not match the expected schema.
pub async fn lookup(client: &reqwest::Client, url: &str) -> Result<Option<Location>, GeocodeError> {
    let resp = client.get(url).send().await?;

    if !resp.status().is_success() {
        return Err(GeocodeError::MalformedResponse {
            message: format!("Postal lookup returned status {}", resp.status()),
        });
    }

    let body = resp.text().await?;
    parse_response(&body)
}

#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "PostOffice", default)]
    post_office: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
struct PostOffice {
    #[serde(rename = "District", default)]
    district: Option<String>,
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "Latitude", default)]
    latitude: Option<Coordinate>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<Coordinate>,
}

/// Coordinates normally arrive as strings; bare numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl PostOffice {
    fn to_location(&self) -> Option<Location> {
        let latitude = self.latitude.as_ref()?.value()?;
        let longitude = self.longitude.as_ref()?.value()?;
        Location::new(
            non_blank_or_unknown(self.district.as_deref()),
            non_blank_or_unknown(self.state.as_deref()),
            latitude,
            longitude,
        )
        .ok()
    }
}

fn non_blank_or_unknown(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN)
}

/// Parses a postal lookup response body.
///
/// Returns `Ok(None)` when the service reports no match. The first post
/// office with numeric, in-range coordinates wins.
fn parse_response(body: &str) -> Result<Option<Location>, GeocodeError> {
    let envelopes: Vec<LookupEnvelope> =
        serde_json::from_str(body).map_err(|e| GeocodeError::MalformedResponse {
            message: format!("Failed to parse postal lookup response: {e}"),
        })?;

    let first = envelopes
        .first()
        .ok_or_else(|| GeocodeError::MalformedResponse {
            message: "Postal lookup response is an empty array".to_string(),
        })?;

    if first.status != "Success" {
        log::debug!("Postal lookup status: {}", first.status);
        return Ok(None);
    }

    let post_offices = first.post_office.as_deref().unwrap_or_default();
    if post_offices.is_empty() {
        return Ok(None);
    }

    post_offices
        .iter()
        .find_map(PostOffice::to_location)
        .map(Some)
        .ok_or_else(|| GeocodeError::MalformedResponse {
            message: format!(
                "None of {} post offices carry numeric coordinates",
                post_offices.len()
            ),
        })
}
