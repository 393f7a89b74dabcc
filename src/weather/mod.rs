//! Point-forecast weather retrieval
//!
//! A [`WeatherSource`] answers one [`WeatherQuery`] with one flattened
//! [`WeatherReading`]. The dashboard asks twice per render, once for "now"
//! and once for the prediction time, and the two answers share nothing.

use async_trait::async_trait;

use crate::error::WeatherError;
use crate::models::{WeatherQuery, WeatherReading};

pub mod meteomatics;

pub use meteomatics::MeteomaticsClient;

pub const TEMPERATURE: &str = "t_2m:C";
pub const PRECIPITATION_24H: &str = "precip_24h:mm";
pub const WIND_SPEED: &str = "wind_speed_10m:ms";
pub const UV_INDEX: &str = "uv:idx";
pub const SUNRISE: &str = "sunrise:sql";
pub const SUNSET: &str = "sunset:sql";

/// Parameters requested when nothing else is configured
pub const DEFAULT_PARAMETERS: [&str; 6] = [
    TEMPERATURE,
    PRECIPITATION_24H,
    WIND_SPEED,
    UV_INDEX,
    SUNRISE,
    SUNSET,
];

/// Anything that can answer a point-in-time weather query
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, WeatherError>;
}

/// Whether a parameter carries an ISO timestamp rather than a measurement
#[must_use]
pub fn is_time_parameter(parameter: &str) -> bool {
    parameter.ends_with(":sql")
}
