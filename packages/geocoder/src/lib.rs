#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postal code to coordinate resolution.
//!
//! Resolves a [`PostalCode`] to a [`Location`] using an ordered chain of
//! resolver strategies configured via TOML files in `services/`:
//!
//! 1. **Postal lookup service** (priority 1): one HTTP request per code
//!    against a templated URL. Returns district, state, and coordinates.
//! 2. **Static table** (priority 2): a small built-in set of known postal
//!    codes. District and state are reported as `"Unknown"`.
//!
//! Strategies are loaded from the [`service_registry`] and tried in
//! priority order until one produces a location. Network and parsing
//! faults inside a strategy are logged and treated as a miss; only
//! [`GeocodeError::UnresolvedLocation`] escapes [`ResolverChain::resolve`].

pub mod postal_lookup;
pub mod service_registry;
pub mod static_table;

use async_trait::async_trait;
use thiserror::Error;
use urban_growth_models::{Location, PostalCode};

use crate::service_registry::{GeocodingService, ProviderConfig};

/// Errors from coordinate resolution.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed or timed out.
    #[error("Network fault: {0}")]
    NetworkFault(#[from] reqwest::Error),

    /// The service answered with an unexpected shape or type.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Description of the parsing failure.
        message: String,
    },

    /// No strategy produced a location for the postal code.
    #[error("Unresolved location for postal code {postal_code}")]
    UnresolvedLocation {
        /// The postal code that could not be resolved.
        postal_code: String,
    },

    /// A service definition could not be turned into a resolver.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

/// A single strategy for resolving a postal code.
///
/// `Ok(None)` means the strategy has no answer for this code and the next
/// strategy should be tried.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Returns a unique identifier for this strategy (e.g., `"static_table"`).
    fn id(&self) -> &str;

    /// Attempts to resolve `postal_code`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the strategy faulted (network failure,
    /// malformed response).
    async fn resolve(&self, postal_code: &PostalCode) -> Result<Option<Location>, GeocodeError>;
}

/// An ordered list of [`LocationResolver`] strategies.
pub struct ResolverChain {
    resolvers: Vec<Box<dyn LocationResolver>>,
}

impl ResolverChain {
    /// Creates a chain that tries `resolvers` in the given order.
    #[must_use]
    pub fn new(resolvers: Vec<Box<dyn LocationResolver>>) -> Self {
        Self { resolvers }
    }

    /// Builds a chain from service definitions, preserving their order.
    ///
    /// Callers normally pass [`service_registry::enabled_services`], which
    /// is already sorted by priority.
    #[must_use]
    pub fn from_services(services: &[GeocodingService], client: &reqwest::Client) -> Self {
        let resolvers = services
            .iter()
            .map(|svc| -> Box<dyn LocationResolver> {
                match &svc.provider {
                    ProviderConfig::PostalLookup { url_template } => Box::new(
                        postal_lookup::PostalLookupResolver::new(client.clone(), url_template),
                    ),
                    ProviderConfig::StaticTable => Box::new(static_table::StaticTableResolver),
                }
            })
            .collect();
        Self::new(resolvers)
    }

    /// Returns the strategy IDs in the order they are tried.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.id()).collect()
    }

    /// Resolves `postal_code` by trying each strategy in order.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::UnresolvedLocation`] if every strategy missed
    /// or faulted. Strategy faults themselves are logged, never returned.
    pub async fn resolve(&self, postal_code: &PostalCode) -> Result<Location, GeocodeError> {
        for resolver in &self.resolvers {
            match resolver.resolve(postal_code).await {
                Ok(Some(location)) => {
                    log::info!(
                        "Resolved {postal_code} via {} to ({}, {})",
                        resolver.id(),
                        location.latitude,
                        location.longitude
                    );
                    return Ok(location);
                }
                Ok(None) => {
                    log::debug!("{} has no entry for {postal_code}", resolver.id());
                }
                Err(e) => {
                    log::warn!("{} failed for {postal_code}: {e}", resolver.id());
                }
            }
        }

        Err(GeocodeError::UnresolvedLocation {
            postal_code: postal_code.to_string(),
        })
    }
}
