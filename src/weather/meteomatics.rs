//! Meteomatics point-forecast client
//!
//! Requests look like `{base}/{timestamp}/{p1,p2,..}/{lat},{lon}/json` and are
//! authenticated with HTTP basic auth. Only the first date of each parameter
//! block is kept: the API answers a single timestamp, so that sample is the
//! one the caller asked for.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::WeatherError;
use crate::models::{ReadingValue, WeatherQuery, WeatherReading};

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Weather API client for Meteomatics
#[derive(Debug, Clone)]
pub struct MeteomaticsClient {
    client: Client,
    base_url: String,
    parameters: Vec<String>,
    credentials: Option<Credentials>,
}

/// Top-level JSON response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Vec<ParameterBlock>,
}

#[derive(Debug, Deserialize)]
struct ParameterBlock {
    parameter: String,
    #[serde(default)]
    coordinates: Vec<CoordinateBlock>,
}

#[derive(Debug, Deserialize)]
struct CoordinateBlock {
    #[serde(default)]
    dates: Vec<DatedValue>,
}

#[derive(Debug, Deserialize)]
struct DatedValue {
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    value: serde_json::Value,
}

impl MeteomaticsClient {
    /// Create a new client. Missing credentials are only reported on fetch.
    pub fn new(config: &WeatherConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(format!("drovaan/{}", crate::VERSION))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        let credentials = config.credentials().map(|(username, password)| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });

        if credentials.is_none() {
            warn!("No weather API credentials configured; weather panels will be unavailable");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            parameters: config.parameters.clone(),
            credentials,
        })
    }

    /// Full request URL for a query
    #[must_use]
    pub fn request_url(&self, query: &WeatherQuery) -> String {
        format!(
            "{}/{}/{}/{},{}/json",
            self.base_url,
            query.wire_timestamp(),
            self.parameters.join(","),
            query.location.latitude,
            query.location.longitude
        )
    }
}

#[async_trait]
impl WeatherSource for MeteomaticsClient {
    #[instrument(skip(self, query), fields(timestamp = %query.wire_timestamp()))]
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, WeatherError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(WeatherError::MissingCredentials)?;

        let url = self.request_url(query);
        debug!("Meteomatics request URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| {
                error!("Weather request failed: {}", e);
                WeatherError::Transport {
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| WeatherError::Transport {
            message: e.to_string(),
        })?;

        if status != reqwest::StatusCode::OK {
            warn!("Weather API returned HTTP {}", status.as_u16());
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let reading = flatten_response(&self.parameters, &body)?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved {} weather parameters in {:.3}s",
            reading.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow weather API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(reading)
    }
}

/// Flatten the nested response into parameter -> first value.
///
/// Every requested parameter is present in the result; ones the service
/// left out read as `NotAvailable`.
fn flatten_response(requested: &[String], body: &str) -> Result<WeatherReading, WeatherError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::InvalidResponse {
            message: e.to_string(),
        })?;

    let mut reading = WeatherReading::with_parameters(requested.iter().cloned());

    for block in response.data {
        let first = block
            .coordinates
            .first()
            .and_then(|coordinate| coordinate.dates.first());

        let value = match first {
            Some(sample) => {
                if reading.timestamp.is_none() {
                    reading.timestamp = sample.date;
                }
                ReadingValue::from_json(&sample.value)
            }
            None => ReadingValue::NotAvailable,
        };
        reading.insert(block.parameter, value);
    }

    Ok(reading)
}
