//! Data models for the Drovaan dashboard
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and the name they were resolved from
//! - Weather: Point-in-time queries and flattened readings
//! - Imagery: Zoom levels, bounding boxes and imagery requests
//! - Telemetry: Synthetic drone sensor samples

pub mod imagery;
pub mod location;
pub mod telemetry;
pub mod weather;

// Re-export all public types for convenient access
pub use imagery::{BoundingBox, ImageryRequest, ZoomLevel};
pub use location::Location;
pub use telemetry::SampleTelemetryPoint;
pub use weather::{NOT_AVAILABLE, ReadingValue, WeatherQuery, WeatherReading};
