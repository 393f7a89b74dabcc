//! Error types and handling for the Drovaan dashboard

use thiserror::Error;

/// Failure to resolve a place name to coordinates.
///
/// Every variant renders to the user as "location not found", but the cause
/// stays visible to callers and logs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    /// Blank place name
    #[error("Location cannot be empty")]
    EmptyQuery,

    /// The service answered but returned no match
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// Network failure or timeout
    #[error("Geocoding service unreachable: {message}")]
    Unreachable { message: String },

    /// The service answered with something we could not read
    #[error("Invalid geocoding response: {message}")]
    InvalidResponse { message: String },
}

impl GeocodeError {
    /// True when the service itself could not be reached or understood
    #[must_use]
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::InvalidResponse { .. })
    }
}

/// Failure to fetch a weather reading for one query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// Non-success response, carried through verbatim
    #[error("Weather API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Network failure or timeout
    #[error("Weather API unreachable: {message}")]
    Transport { message: String },

    /// Success status but the body could not be decoded
    #[error("Invalid weather response: {message}")]
    InvalidResponse { message: String },

    /// No username/password configured for the weather service
    #[error("Weather API credentials are not configured")]
    MissingCredentials,
}

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Geocoding failed; nothing else is rendered
    #[error("Could not find location for city: {city}")]
    LocationNotFound {
        city: String,
        #[source]
        source: GeocodeError,
    },

    /// Sample telemetry could not be generated
    #[error("Telemetry error: {message}")]
    Telemetry { message: String },
}

impl DashboardError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(city: S, source: GeocodeError) -> Self {
        Self::LocationNotFound {
            city: city.into(),
            source,
        }
    }

    pub fn telemetry<S: Into<String>>(message: S) -> Self {
        Self::Telemetry {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Config { .. } => {
                "Configuration error. Please check your config file and credentials.".to_string()
            }
            DashboardError::Validation { message } => format!("Invalid input: {message}"),
            DashboardError::LocationNotFound { city, .. } => {
                format!("Could not find location for city: {city}")
            }
            DashboardError::Telemetry { .. } => {
                "Sample drone data is currently unavailable.".to_string()
            }
        }
    }
}
