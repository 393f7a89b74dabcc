//! Drovaan - hyperlocal weather and atmospheric monitoring
//!
//! This library resolves a city to coordinates, fetches live and forecast
//! point weather, builds satellite imagery URLs and produces sample drone
//! telemetry. Rendering is left to the caller: the CLI prints text and the
//! web module serves JSON.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod geocoding;
pub mod imagery;
pub mod logging;
pub mod models;
pub mod telemetry;
pub mod time_format;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardRequest, DashboardView, DroneMode, ViewMode};
pub use error::{DashboardError, GeocodeError, WeatherError};
pub use geocoding::{Geocoder, NominatimGeocoder};
pub use imagery::ImageryUrlBuilder;
pub use models::{Location, WeatherQuery, WeatherReading, ZoomLevel};
pub use weather::{MeteomaticsClient, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DashboardError>;
