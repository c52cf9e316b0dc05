//! OpenRouteService directions adapter.
//!
//! Computes driving-car routes between two coordinates. Requests are paced
//! by a fixed configurable interval to stay inside the free-tier quota.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Coordinate, LocationKey, LonLat, RouteRecord};

use super::RoutePlanner;
use super::error::ProviderError;

/// Default base URL for the OpenRouteService API.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Default pause before each request.
const DEFAULT_PACE: Duration = Duration::from_secs(3);

/// GeoJSON response DTOs, trimmed to the fields we read.
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    summary: RouteSummary,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Travel time in seconds (fractional).
    duration: f64,
    /// Travel distance in meters.
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: Vec<LonLat>,
}

/// Configuration for the OpenRouteService client.
#[derive(Debug, Clone)]
pub struct OrsConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Pause inserted before each request.
    pub pace: Duration,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl OrsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            pace: DEFAULT_PACE,
            timeout_secs: 30,
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

/// Routing adapter backed by the OpenRouteService directions API.
pub struct OrsRouter {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pace: Duration,
}

impl OrsRouter {
    /// Create a new router with the given configuration.
    pub fn new(config: OrsConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            pace: config.pace,
        })
    }

    /// Request directions and convert the first feature into a record.
    async fn directions(
        &self,
        start: Coordinate,
        end: Coordinate,
        start_key: &LocationKey,
        end_key: &LocationKey,
    ) -> Result<Option<RouteRecord>, ProviderError> {
        let url = format!("{}/v2/directions/driving-car", self.base_url);
        let start_param = lon_lat_param(start);
        let end_param = lon_lat_param(end);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("start", start_param.as_str()),
                ("end", end_param.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }
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
        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Json {
                message: e.to_string(),
            })?;

        let Some(feature) = parsed.features.into_iter().next() else {
            return Ok(None);
        };

        let summary = feature.properties.summary;
        Ok(Some(RouteRecord {
            start: start_key.clone(),
            end: end_key.clone(),
            duration_secs: summary.duration as u32,
            distance_m: summary.distance,
            geometry: feature.geometry.coordinates,
        }))
    }
}

/// Render a coordinate as the `lon,lat` query parameter ORS expects.
fn lon_lat_param(c: Coordinate) -> String {
    format!("{},{}", c.lon(), c.lat())
}

impl RoutePlanner for OrsRouter {
    async fn route(
        &self,
        start: Coordinate,
        end: Coordinate,
        start_key: &LocationKey,
        end_key: &LocationKey,
    ) -> Option<RouteRecord> {
        debug!(start = %start_key, end = %end_key, "requesting route");
        tokio::time::sleep(self.pace).await;

        match self.directions(start, end, start_key, end_key).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!(start = %start_key, end = %end_key, "provider returned no route");
                None
            }
            Err(e) => {
                warn!(start = %start_key, end = %end_key, error = %e, "route computation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = OrsConfig::new("test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pace, Duration::from_secs(3));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_builders() {
        let config = OrsConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_pace(Duration::ZERO)
            .with_timeout(5);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.pace, Duration::ZERO);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn query_parameter_is_lon_lat_ordered() {
        let c = Coordinate::new(45.6983, 9.6773).unwrap();
        assert_eq!(lon_lat_param(c), "9.6773,45.6983");
    }

    #[test]
    fn directions_response_deserializes() {
        let body = r#"{
            "features": [{
                "properties": {"summary": {"duration": 720.6, "distance": 12500.0}},
                "geometry": {"coordinates": [[9.6773, 45.6983], [9.5969, 45.6469]]}
            }]
        }"#;

        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        let feature = &parsed.features[0];
        assert_eq!(feature.properties.summary.duration, 720.6);
        assert_eq!(feature.properties.summary.distance, 12500.0);
        assert_eq!(feature.geometry.coordinates[0], (9.6773, 45.6983));
    }

    #[test]
    fn empty_feature_list_deserializes() {
        let parsed: DirectionsResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(parsed.features.is_empty());
    }
}
