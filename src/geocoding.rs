//! Place name resolution
//!
//! Resolves a free-text city name to coordinates through a Nominatim-style
//! search endpoint. The first match wins. Any failure surfaces as a tagged
//! [`GeocodeError`] so callers can tell "no such place" from "service down"
//! even when the user sees the same message for both.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::error::GeocodeError;
use crate::models::Location;

/// Anything that can turn a place name into a location
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Location, GeocodeError>;
}

/// Client for the OpenStreetMap Nominatim search API
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

/// One search hit. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    /// Create a new geocoder
    pub fn new(config: &GeocodingConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Location, GeocodeError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        info!("Geocoding location: '{}'", place);
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", place), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                warn!("Geocoding request failed for '{}': {}", place, e);
                GeocodeError::Unreachable {
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding service returned HTTP {}", status);
            return Err(GeocodeError::Unreachable {
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().await.map_err(|e| GeocodeError::Unreachable {
            message: e.to_string(),
        })?;

        let location = parse_search_response(place, &body)?;

        info!(
            "Resolved '{}' to ({:.4}, {:.4}) in {:.3}s",
            place,
            location.latitude,
            location.longitude,
            start_time.elapsed().as_secs_f64()
        );

        Ok(location)
    }
}

/// Pick the first hit out of a search response body
fn parse_search_response(place: &str, body: &str) -> Result<Location, GeocodeError> {
    let results: Vec<SearchResult> =
        serde_json::from_str(body).map_err(|e| GeocodeError::InvalidResponse {
            message: e.to_string(),
        })?;

    let Some(first) = results.into_iter().next() else {
        warn!("No results found for location '{}'", place);
        return Err(GeocodeError::NotFound {
            query: place.to_string(),
        });
    };

    debug!("First geocoding hit: {:?}", first.display_name);

    let latitude = first
        .lat
        .parse::<f64>()
        .map_err(|e| GeocodeError::InvalidResponse {
            message: format!("Invalid latitude '{}': {e}", first.lat),
        })?;
    let longitude = first
        .lon
        .parse::<f64>()
        .map_err(|e| GeocodeError::InvalidResponse {
            message: format!("Invalid longitude '{}': {e}", first.lon),
        })?;

    Location::try_new(latitude, longitude, place.to_string()).map_err(|e| {
        GeocodeError::InvalidResponse {
            message: e.to_string(),
        }
    })
}
