//! Configuration management for the Drovaan dashboard
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. Weather service
//! credentials are only ever injected here, never compiled in.

use crate::DashboardError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Geocoding service configuration
    pub geocoding: GeocodingConfig,
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Satellite imagery configuration
    pub imagery: ImageryConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// Sample drone telemetry settings
    pub telemetry: TelemetryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL of the search service
    pub base_url: String,
    /// User-Agent sent with every request, required by the service's usage policy
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Weather API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for the point-forecast API
    pub base_url: String,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Parameters requested on every call
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageryConfig {
    /// WMS endpoint
    pub base_url: String,
    /// Layers composited into the atmospheric view
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA timezone used for sunrise/sunset display
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Number of synthetic samples per render
    pub samples: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("drovaan-dashboard/{}", crate::VERSION)
}

fn default_geocoding_timeout() -> u64 {
    10
}

fn default_weather_base_url() -> String {
    "https://api.meteomatics.com".to_string()
}

fn default_weather_parameters() -> Vec<String> {
    crate::weather::DEFAULT_PARAMETERS
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_imagery_base_url() -> String {
    "https://gibs.earthdata.nasa.gov/wms/epsg4326/best/wms.cgi".to_string()
}

fn default_imagery_layers() -> Vec<String> {
    vec![
        "MODIS_Terra_CorrectedReflectance_TrueColor".to_string(),
        "Reference_Labels_15m".to_string(),
    ]
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_samples() -> usize {
    crate::telemetry::DEFAULT_SAMPLES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_geocoding_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            username: None,
            password: None,
            parameters: default_weather_parameters(),
        }
    }
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            base_url: default_imagery_base_url(),
            layers: default_imagery_layers(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// Username and password, if both are present
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

impl DisplayConfig {
    /// Parsed display timezone, falling back to the default on unknown names
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.timezone
            .parse()
            .unwrap_or(chrono_tz::Asia::Kolkata)
    }
}

impl DashboardConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. DROVAAN_WEATHER__USERNAME
        builder = builder.add_source(
            Environment::with_prefix("DROVAAN")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("weather.parameters")
                .with_list_parse_key("imagery.layers")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DashboardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("drovaan").join("config.toml"))
    }

    /// Apply default values to blank configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.imagery.base_url.is_empty() {
            self.imagery.base_url = default_imagery_base_url();
        }
        if self.imagery.layers.is_empty() {
            self.imagery.layers = default_imagery_layers();
        }
        if self.display.timezone.is_empty() {
            self.display.timezone = default_timezone();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Credentials are optional, but must not be blank when given
    pub fn validate_credentials(&self) -> Result<()> {
        if self.weather.username.as_deref().is_some_and(str::is_empty) {
            return Err(DashboardError::config(
                "Weather API username cannot be empty if provided",
            )
            .into());
        }
        if self.weather.password.as_deref().is_some_and(str::is_empty) {
            return Err(DashboardError::config(
                "Weather API password cannot be empty if provided",
            )
            .into());
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(DashboardError::config(
                "Geocoding timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        let max_samples = crate::telemetry::MAX_SAMPLES;
        if self.telemetry.samples == 0 || self.telemetry.samples > max_samples {
            return Err(DashboardError::config(format!(
                "Telemetry samples must be between 1 and {max_samples}"
            ))
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DashboardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Weather API", &self.weather.base_url),
            ("Imagery", &self.imagery.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DashboardError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.weather.parameters.is_empty() {
            return Err(DashboardError::config("At least one weather parameter is required").into());
        }

        if self.display.timezone.parse::<Tz>().is_err() {
            return Err(DashboardError::config(format!(
                "Unknown display timezone '{}'",
                self.display.timezone
            ))
            .into());
        }

        Ok(())
    }
}
