//! Zoom levels, bounding boxes and satellite imagery requests

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use crate::DashboardError;

/// Global daily composites lag by one day, so imagery is always "yesterday" in UTC
pub const IMAGERY_LAG_DAYS: i64 = 1;

/// Half-width of the bounding box in degrees, indexed by zoom level
const BBOX_HALF_WIDTH_DEGREES: [f64; 7] = [2.0, 1.0, 0.5, 0.25, 0.1, 0.05, 0.025];

/// Edge length of the square image in pixels, indexed by zoom level
const IMAGE_EDGE_PIXELS: [u32; 7] = [300, 400, 500, 600, 800, 900, 1000];

/// Discrete zoom level in `0..=6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 6;
    /// Used when a raw level is out of range
    pub const FALLBACK: ZoomLevel = ZoomLevel(4);
    /// Used when the atmospheric view is opened without a zoom
    pub const VIEW_DEFAULT: ZoomLevel = ZoomLevel(2);

    /// Lenient conversion: anything outside `0..=6` becomes level 4
    #[must_use]
    pub fn or_default(raw: i64) -> Self {
        u8::try_from(raw)
            .ok()
            .and_then(|level| Self::try_from(level).ok())
            .unwrap_or_else(|| {
                tracing::warn!("Zoom level {} out of range, using {}", raw, Self::FALLBACK);
                Self::FALLBACK
            })
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }

    /// Bounding-box half-width in degrees
    #[must_use]
    pub fn half_width_degrees(self) -> f64 {
        BBOX_HALF_WIDTH_DEGREES[usize::from(self.0)]
    }

    /// Square image edge length in pixels
    #[must_use]
    pub fn image_edge_pixels(self) -> u32 {
        IMAGE_EDGE_PIXELS[usize::from(self.0)]
    }

    pub fn all() -> impl Iterator<Item = ZoomLevel> {
        (Self::MIN..=Self::MAX).map(ZoomLevel)
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::VIEW_DEFAULT
    }
}

impl TryFrom<u8> for ZoomLevel {
    type Error = DashboardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(DashboardError::validation(format!(
                "Zoom level must be between {} and {}, got: {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

impl From<ZoomLevel> for u8 {
    fn from(zoom: ZoomLevel) -> Self {
        zoom.0
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lat/lon rectangle, serialized in WMS 1.3.0 EPSG:4326 axis order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn centered(latitude: f64, longitude: f64, half_width: f64) -> Self {
        Self {
            min_lat: latitude - half_width,
            min_lon: longitude - half_width,
            max_lat: latitude + half_width,
            max_lon: longitude + half_width,
        }
    }

    /// True when `other` lies entirely inside `self`
    #[must_use]
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.min_lat
            && self.min_lon <= other.min_lon
            && self.max_lat >= other.max_lat
            && self.max_lon >= other.max_lon
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

/// Everything needed to ask the imagery service for one picture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageryRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: ZoomLevel,
    pub layers: Vec<String>,
    /// Composite date; always the UTC day before `now`
    pub date: NaiveDate,
}

impl ImageryRequest {
    #[must_use]
    pub fn new(
        location: &Location,
        zoom: ZoomLevel,
        layers: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            zoom,
            layers,
            date: (now - Duration::days(IMAGERY_LAG_DAYS)).date_naive(),
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::centered(self.latitude, self.longitude, self.zoom.half_width_degrees())
    }

    /// Image width and height; always equal
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        let edge = self.zoom.image_edge_pixels();
        (edge, edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zoom_tables_cover_every_level() {
        let levels: Vec<u8> = ZoomLevel::all().map(ZoomLevel::level).collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(ZoomLevel::try_from(0).unwrap().half_width_degrees(), 2.0);
        assert_eq!(ZoomLevel::try_from(6).unwrap().half_width_degrees(), 0.025);
        assert_eq!(ZoomLevel::try_from(0).unwrap().image_edge_pixels(), 300);
        assert_eq!(ZoomLevel::try_from(6).unwrap().image_edge_pixels(), 1000);
    }

    #[test]
    fn test_zoom_out_of_range() {
        assert!(ZoomLevel::try_from(7).is_err());
        assert_eq!(ZoomLevel::or_default(7), ZoomLevel::FALLBACK);
        assert_eq!(ZoomLevel::or_default(-1), ZoomLevel::FALLBACK);
        assert_eq!(ZoomLevel::or_default(3).level(), 3);

        let fallback = ZoomLevel::or_default(99);
        assert_eq!(fallback.half_width_degrees(), 0.1);
        assert_eq!(fallback.image_edge_pixels(), 800);
    }

    #[test]
    fn test_zoom_deserialize_rejects_out_of_range() {
        let ok: ZoomLevel = serde_json::from_str("5").unwrap();
        assert_eq!(ok.level(), 5);
        assert!(serde_json::from_str::<ZoomLevel>("12").is_err());
    }

    #[test]
    fn test_imagery_date_is_yesterday_utc() {
        let location = Location::new(13.08, 80.27, "Chennai".to_string());
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 15, 0).unwrap();
        let request = ImageryRequest::new(&location, ZoomLevel::default(), vec![], now);
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_bounding_box_display_order() {
        let bbox = BoundingBox::centered(10.0, 20.0, 0.5);
        assert_eq!(bbox.to_string(), "9.5,19.5,10.5,20.5");
    }
}
