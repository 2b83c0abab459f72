//! Built-in fallback coordinates for a handful of well-known postal codes.
//!
//! This is a last-resort static dataset, not a cache: it is consulted only
//! after every live strategy has missed or faulted, and it is never
//! updated at runtime.

use async_trait::async_trait;
use urban_growth_models::{Location, PostalCode};

use crate::{GeocodeError, LocationResolver};

/// `(postal code, latitude, longitude)` entries.
pub const FALLBACK_COORDINATES: &[(&str, f64, f64)] = &[
    ("500055", 17.44, 78.37), // Hyderabad, Kukatpally
    ("500001", 17.385, 78.4867), // Hyderabad GPO
    ("110001", 28.6139, 77.209), // New Delhi, Connaught Place
    ("400001", 18.9388, 72.8354), // Mumbai GPO
    ("560001", 12.9716, 77.5946), // Bengaluru, MG Road
    ("600001", 13.0827, 80.2707), // Chennai GPO
    ("700001", 22.5726, 88.3639), // Kolkata, BBD Bagh
];

/// Looks up `postal_code` in [`FALLBACK_COORDINATES`].
#[must_use]
pub fn lookup(postal_code: &str) -> Option<(f64, f64)> {
    FALLBACK_COORDINATES
        .iter()
        .find(|(code, _, _)| *code == postal_code)
        .map(|&(_, lat, lon)| (lat, lon))
}

/// Resolver strategy backed by [`FALLBACK_COORDINATES`].
///
/// District and state are always reported as `"Unknown"`.
pub struct StaticTableResolver;

#[async_trait]
impl LocationResolver for StaticTableResolver {
    fn id(&self) -> &str {
        "static_table"
    }

    async fn resolve(&self, postal_code: &PostalCode) -> Result<Option<Location>, GeocodeError> {
        let Some((latitude, longitude)) = lookup(postal_code.as_str()) else {
            return Ok(None);
        };

        Location::unknown(latitude, longitude)
            .map(Some)
            .map_err(|e| GeocodeError::Config {
                message: format!("Fallback entry for {postal_code} is invalid: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use urban_growth_models::{UNKNOWN, coordinates_in_range};

    use super::*;

    #[test]
    fn entries_are_unique_and_in_range() {
        let mut seen = BTreeSet::new();
        for &(code, lat, lon) in FALLBACK_COORDINATES {
            assert!(seen.insert(code), "Duplicate fallback entry: {code}");
            assert!(coordinates_in_range(lat, lon), "{code} is out of range");
        }
    }

    #[test]
    fn looks_up_known_code() {
        assert_eq!(lookup("500055"), Some((17.44, 78.37)));
        assert_eq!(lookup("999999"), None);
    }

    #[tokio::test]
    async fn resolves_with_unknown_names() {
        let code = PostalCode::new("500055").unwrap();
        let location = StaticTableResolver.resolve(&code).await.unwrap().unwrap();
        assert_eq!(location.district, UNKNOWN);
        assert_eq!(location.state, UNKNOWN);
        assert!((location.latitude - 17.44).abs() < f64::EPSILON);
        assert!((location.longitude - 78.37).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unknown_code_is_a_miss() {
        let code = PostalCode::new("12345").unwrap();
        assert!(StaticTableResolver.resolve(&code).await.unwrap().is_none());
    }
}
