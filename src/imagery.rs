//! Satellite imagery URL construction
//!
//! Builds WMS 1.3.0 `GetMap` URLs for NASA GIBS. Nothing here touches the
//! network; the URL is handed to whatever renders the page.

use chrono::{DateTime, Utc};

use crate::config::ImageryConfig;
use crate::models::{ImageryRequest, Location, ZoomLevel};

/// Builds imagery URLs against one WMS endpoint
#[derive(Debug, Clone)]
pub struct ImageryUrlBuilder {
    base_url: String,
    layers: Vec<String>,
}

impl ImageryUrlBuilder {
    #[must_use]
    pub fn new(config: &ImageryConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('?').to_string(),
            layers: config.layers.clone(),
        }
    }

    /// Request for the configured layers around `location`
    #[must_use]
    pub fn request(
        &self,
        location: &Location,
        zoom: ZoomLevel,
        now: DateTime<Utc>,
    ) -> ImageryRequest {
        ImageryRequest::new(location, zoom, self.layers.clone(), now)
    }

    /// URL for the configured layers around `location`
    #[must_use]
    pub fn url_for(&self, location: &Location, zoom: ZoomLevel, now: DateTime<Utc>) -> String {
        self.url(&self.request(location, zoom, now))
    }

    /// URL for an explicit request
    #[must_use]
    pub fn url(&self, request: &ImageryRequest) -> String {
        format!("{}?{}", self.base_url, query_string(request))
    }
}

/// WMS `GetMap` query string, parameters in fixed order
#[must_use]
pub fn query_string(request: &ImageryRequest) -> String {
    let (width, height) = request.dimensions();
    let layers = request
        .layers
        .iter()
        .map(|layer| urlencoding::encode(layer).into_owned())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "SERVICE=WMS&REQUEST=GetMap&VERSION=1.3.0&LAYERS={layers}&\
         STYLES=&FORMAT=image/png&TRANSPARENT=TRUE&HEIGHT={height}&WIDTH={width}&\
         CRS=EPSG:4326&BBOX={bbox}&TIME={date}",
        bbox = request.bounding_box(),
        date = request.date.format("%Y-%m-%d"),
    )
}
