//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

use crate::DashboardError;

/// A resolved place: coordinates plus the name it was resolved from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
}

impl Location {
    /// Create a new location without range checks
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
        }
    }

    /// Create a location, rejecting coordinates outside [-90,90] / [-180,180]
    pub fn try_new(latitude: f64, longitude: f64, name: String) -> Result<Self, DashboardError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DashboardError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DashboardError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }

        Ok(Self::new(latitude, longitude, name))
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
