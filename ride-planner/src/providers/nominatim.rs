//! Nominatim geocoding adapter.
//!
//! Builds search queries from the location directory (display name plus a
//! geographic context) and paces every request to honor Nominatim's
//! one-request-per-second usage policy.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LocationDirectory;
use crate::domain::{Coordinate, LocationKey};

use super::Geocoder;
use super::error::ProviderError;

/// Default base URL for the Nominatim search API.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default pause before each request (usage policy: 1 req/sec).
const DEFAULT_PACE: Duration = Duration::from_secs(1);

/// One result row from the search endpoint. Nominatim returns the
/// coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// User agent identifying this application (required by Nominatim).
    pub user_agent: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Pause inserted before each request.
    pub pace: Duration,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl NominatimConfig {
    /// Create a new config with the given user agent.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            pace: DEFAULT_PACE,
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the pause inserted before each request.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Geocoding adapter backed by Nominatim (OpenStreetMap).
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
    pace: Duration,
    directory: Arc<LocationDirectory>,
}

impl NominatimGeocoder {
    /// Create a new geocoder over the given location directory.
    pub fn new(
        config: NominatimConfig,
        directory: Arc<LocationDirectory>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            pace: config.pace,
            directory,
        })
    }

    /// Build the search query for a key.
    ///
    /// Sub-localities get the city context so that district names resolve
    /// inside the city instead of matching a same-named town elsewhere.
    /// Returns `None` for keys the directory does not know.
    fn query_for(&self, key: &LocationKey) -> Option<String> {
        let name = self.directory.display_name(key)?;
        let context = if self.directory.is_sub_locality(key) {
            self.directory.city_context()
        } else {
            self.directory.country_context()
        };
        Some(format!("{name}, {context}"))
    }

    /// Run a search query, returning the best match if any.
    async fn search(&self, query: &str) -> Result<Option<Coordinate>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Json {
                message: e.to_string(),
            })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        parse_place(&place).map(Some)
    }
}

/// Convert a result row into a validated coordinate.
fn parse_place(place: &NominatimPlace) -> Result<Coordinate, ProviderError> {
    let lat: f64 = place.lat.parse().map_err(|_| ProviderError::Json {
        message: format!("non-numeric latitude: {:?}", place.lat),
    })?;
    let lon: f64 = place.lon.parse().map_err(|_| ProviderError::Json {
        message: format!("non-numeric longitude: {:?}", place.lon),
    })?;

    Coordinate::new(lat, lon).map_err(|e| ProviderError::Json {
        message: e.to_string(),
    })
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, key: &LocationKey) -> Option<Coordinate> {
        let Some(query) = self.query_for(key) else {
            warn!(key = %key, "location key has no display name, cannot geocode");
            return None;
        };

        debug!(key = %key, query = %query, "geocoding");
        tokio::time::sleep(self.pace).await;

        match self.search(&query).await {
            Ok(Some(coordinate)) => Some(coordinate),
            Ok(None) => {
                debug!(key = %key, query = %query, "no geocoding result");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "geocoding failed");
                None
            }
        }
    }
}
