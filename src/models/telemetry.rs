//! Synthetic drone sensor sample

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One synthetic drone reading. Points are independent of each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleTelemetryPoint {
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
}

impl SampleTelemetryPoint {
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.2} °C", self.temperature)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{:.2} %", self.humidity)
    }
}
