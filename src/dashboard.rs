//! Dashboard orchestration
//!
//! Turns one immutable [`DashboardRequest`] into one [`DashboardView`]:
//! resolve the city, then either produce drone samples, two independent
//! weather panels, or a satellite imagery URL. Each render starts from
//! scratch; nothing is cached between renders.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, WeatherError};
use crate::geocoding::{Geocoder, NominatimGeocoder};
use crate::imagery::ImageryUrlBuilder;
use crate::models::{
    ImageryRequest, Location, SampleTelemetryPoint, WeatherQuery, WeatherReading, ZoomLevel,
};
use crate::telemetry;
use crate::time_format::format_utc_timestamp;
use crate::weather::{self, MeteomaticsClient, WeatherSource};

pub const DEFAULT_CITY: &str = "Chennai";

const ABOUT_TEXT: &str = "Drovaan Dashboard is a hyperlocal weather and atmospheric \
monitoring platform. It pairs point forecasts from a global meteorological model with \
daily satellite composites and drone-mounted environmental sensors, so short-term \
conditions for a single city can be read at a glance.";

/// Which page the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Navigator,
    #[serde(alias = "atmospheric")]
    AtmosphericView,
    About,
}

impl FromStr for ViewMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "navigator" => Ok(Self::Navigator),
            "atmospheric" | "atmospheric-view" | "atmospheric view" => Ok(Self::AtmosphericView),
            "about" => Ok(Self::About),
            other => Err(DashboardError::validation(format!(
                "Unknown view '{other}'. Supported views: navigator, atmospheric, about"
            ))),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Navigator => "navigator",
            Self::AtmosphericView => "atmospheric",
            Self::About => "about",
        })
    }
}

/// Drone data toggle and sub-mode folded into one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DroneMode {
    #[default]
    Disabled,
    Conditions,
    #[serde(alias = "history")]
    DataHistory,
}

impl DroneMode {
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl FromStr for DroneMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "disabled" | "none" => Ok(Self::Disabled),
            "conditions" => Ok(Self::Conditions),
            "history" | "data-history" | "data history" => Ok(Self::DataHistory),
            other => Err(DashboardError::validation(format!(
                "Unknown drone mode '{other}'. Supported modes: off, conditions, history"
            ))),
        }
    }
}

/// Everything the user chose for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub view: ViewMode,
    pub city: String,
    pub prediction_date: NaiveDate,
    /// Time of day in UTC
    pub prediction_time: NaiveTime,
    pub drone: DroneMode,
    /// Only meaningful for the atmospheric view
    pub zoom: Option<ZoomLevel>,
}

impl DashboardRequest {
    /// Defaults as first shown: Chennai, tomorrow at 12:00 UTC
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            view: ViewMode::default(),
            city: DEFAULT_CITY.to_string(),
            prediction_date: today + Duration::days(1),
            prediction_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            drone: DroneMode::default(),
            zoom: None,
        }
    }

    /// Prediction date and time combined, in UTC
    #[must_use]
    pub fn prediction_datetime(&self) -> DateTime<Utc> {
        self.prediction_date.and_time(self.prediction_time).and_utc()
    }

    /// City as sent to the geocoder
    #[must_use]
    pub fn trimmed_city(&self) -> &str {
        self.city.trim()
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), DashboardError> {
        if self.trimmed_city().is_empty() {
            return Err(DashboardError::validation("Please enter a valid city name."));
        }

        let tomorrow = today + Duration::days(1);
        if self.prediction_date < tomorrow {
            return Err(DashboardError::validation(format!(
                "Prediction date must be on or after {tomorrow}, got: {}",
                self.prediction_date
            )));
        }

        Ok(())
    }
}

/// One labelled value in a weather panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub label: &'static str,
    pub parameter: &'static str,
    pub value: String,
}

/// Display rows in panel order
const PANEL_LAYOUT: [(&str, &str); 6] = [
    ("Temp", weather::TEMPERATURE),
    ("Wind", weather::WIND_SPEED),
    ("Precip (24h)", weather::PRECIPITATION_24H),
    ("UV", weather::UV_INDEX),
    ("Sunrise", weather::SUNRISE),
    ("Sunset", weather::SUNSET),
];

/// A rendered weather reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPanel {
    pub title: &'static str,
    pub rows: Vec<PanelRow>,
    pub reading: WeatherReading,
}

impl WeatherPanel {
    #[must_use]
    pub fn new(title: &'static str, reading: WeatherReading, tz: Tz) -> Self {
        let rows = PANEL_LAYOUT
            .iter()
            .map(|&(label, parameter)| {
                let value = reading.get(parameter);
                let value = if weather::is_time_parameter(parameter) {
                    format_utc_timestamp(value.as_text(), tz)
                } else {
                    value.to_string()
                };
                PanelRow {
                    label,
                    parameter,
                    value,
                }
            })
            .collect();

        Self { title, rows, reading }
    }

    #[must_use]
    pub fn value(&self, parameter: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.parameter == parameter)
            .map(|row| row.value.as_str())
    }
}

/// A panel, or the reason it is left off the page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome {
    Ready(WeatherPanel),
    Omitted {
        message: String,
        #[serde(skip)]
        error: WeatherError,
    },
}

impl PanelOutcome {
    fn from_fetch(
        title: &'static str,
        result: Result<WeatherReading, WeatherError>,
        tz: Tz,
    ) -> Self {
        match result {
            Ok(reading) => Self::Ready(WeatherPanel::new(title, reading, tz)),
            Err(error) => {
                warn!("{} panel omitted: {}", title, error);
                Self::Omitted {
                    message: error.to_string(),
                    error,
                }
            }
        }
    }

    #[must_use]
    pub fn panel(&self) -> Option<&WeatherPanel> {
        match self {
            Self::Ready(panel) => Some(panel),
            Self::Omitted { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&WeatherError> {
        match self {
            Self::Ready(_) => None,
            Self::Omitted { error, .. } => Some(error),
        }
    }
}

/// What a render produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardContent {
    About {
        text: &'static str,
    },
    DroneConditions {
        latest: Option<SampleTelemetryPoint>,
    },
    DroneHistory {
        samples: Vec<SampleTelemetryPoint>,
    },
    Navigator {
        live: PanelOutcome,
        forecast: PanelOutcome,
        prediction_time: DateTime<Utc>,
    },
    Atmospheric {
        zoom: ZoomLevel,
        imagery_url: String,
        imagery: ImageryRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Resolved city; absent only for the about page
    pub location: Option<Location>,
    pub content: DashboardContent,
}

/// The orchestrator. Holds clients only; no per-request state.
#[derive(Clone)]
pub struct Dashboard {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherSource>,
    imagery: ImageryUrlBuilder,
    timezone: Tz,
    samples: usize,
}

impl Dashboard {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherSource>,
        imagery: ImageryUrlBuilder,
        timezone: Tz,
        samples: usize,
    ) -> Self {
        Self {
            geocoder,
            weather,
            imagery,
            timezone,
            samples,
        }
    }

    /// Wire up the real HTTP clients from configuration
    pub fn from_config(config: &DashboardConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(NominatimGeocoder::new(&config.geocoding)?),
            Arc::new(MeteomaticsClient::new(&config.weather)?),
            ImageryUrlBuilder::new(&config.imagery),
            config.display.tz(),
            config.telemetry.samples,
        ))
    }

    #[instrument(skip(self, request), fields(view = %request.view, city = %request.city))]
    pub async fn render(
        &self,
        request: &DashboardRequest,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, DashboardError> {
        if request.view == ViewMode::About {
            return Ok(DashboardView {
                location: None,
                content: DashboardContent::About { text: ABOUT_TEXT },
            });
        }

        request.validate(now.date_naive())?;

        let city = request.trimmed_city();
        let location = self
            .geocoder
            .geocode(city)
            .await
            .map_err(|source| {
                if source.is_service_failure() {
                    warn!("Geocoding service failure for '{}': {}", city, source);
                } else {
                    info!("No location found for '{}'", city);
                }
                DashboardError::location_not_found(city, source)
            })?;

        let content = if request.drone.is_enabled() {
            self.drone_content(request.drone, now)?
        } else {
            match request.view {
                ViewMode::Navigator => self.navigator_content(request, &location, now).await,
                ViewMode::AtmosphericView => self.atmospheric_content(request, &location, now),
                ViewMode::About => DashboardContent::About { text: ABOUT_TEXT },
            }
        };

        Ok(DashboardView {
            location: Some(location),
            content,
        })
    }

    fn drone_content(
        &self,
        mode: DroneMode,
        now: DateTime<Utc>,
    ) -> Result<DashboardContent, DashboardError> {
        let samples = telemetry::generate(self.samples, now)?;
        Ok(match mode {
            DroneMode::DataHistory => DashboardContent::DroneHistory { samples },
            _ => DashboardContent::DroneConditions {
                latest: samples.last().cloned(),
            },
        })
    }

    async fn navigator_content(
        &self,
        request: &DashboardRequest,
        location: &Location,
        now: DateTime<Utc>,
    ) -> DashboardContent {
        let live_query = WeatherQuery::new(location.clone(), now);
        let live = self.weather.fetch(&live_query).await;

        let prediction_time = request.prediction_datetime();
        let forecast_query = WeatherQuery::new(location.clone(), prediction_time);
        let forecast = self.weather.fetch(&forecast_query).await;

        DashboardContent::Navigator {
            live: PanelOutcome::from_fetch("Live Weather Data", live, self.timezone),
            forecast: PanelOutcome::from_fetch("Weather Forecast", forecast, self.timezone),
            prediction_time,
        }
    }

    fn atmospheric_content(
        &self,
        request: &DashboardRequest,
        location: &Location,
        now: DateTime<Utc>,
    ) -> DashboardContent {
        let zoom = request.zoom.unwrap_or_default();
        let imagery = self.imagery.request(location, zoom, now);
        DashboardContent::Atmospheric {
            zoom,
            imagery_url: self.imagery.url(&imagery),
            imagery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageryConfig;
    use crate::error::GeocodeError;
    use crate::models::ReadingValue;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct FixedGeocoder(Option<Location>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, place: &str) -> Result<Location, GeocodeError> {
            self.0.clone().ok_or_else(|| GeocodeError::NotFound {
                query: place.to_string(),
            })
        }
    }

    /// Records every query; fails queries for the timestamps listed in `fail_at`
    #[derive(Default)]
    struct RecordingWeather {
        queries: Mutex<Vec<WeatherQuery>>,
        fail_at: Vec<DateTime<Utc>>,
    }

    #[async_trait]
    impl WeatherSource for RecordingWeather {
        async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherReading, WeatherError> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail_at.contains(&query.timestamp) {
                return Err(WeatherError::Upstream {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            let mut reading = WeatherReading::with_parameters(weather::DEFAULT_PARAMETERS);
            reading.insert(weather::TEMPERATURE, ReadingValue::Number(30.0));
            reading.insert(
                weather::SUNRISE,
                ReadingValue::Text("2024-06-02T00:13:00Z".to_string()),
            );
            Ok(reading)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 15).unwrap()
    }

    fn chennai() -> Location {
        Location::new(13.0827, 80.2707, "Chennai".to_string())
    }

    fn dashboard(location: Option<Location>, weather: Arc<RecordingWeather>) -> Dashboard {
        Dashboard::new(
            Arc::new(FixedGeocoder(location)),
            weather,
            ImageryUrlBuilder::new(&ImageryConfig::default()),
            chrono_tz::Asia::Kolkata,
            50,
        )
    }

    #[test]
    fn test_request_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let request = DashboardRequest::new(today);
        assert_eq!(request.city, "Chennai");
        assert_eq!(request.view, ViewMode::Navigator);
        assert_eq!(request.drone, DroneMode::Disabled);
        assert_eq!(
            request.prediction_datetime(),
            Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap()
        );
        assert!(request.validate(today).is_ok());
    }

    #[test]
    fn test_request_validation() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut blank = DashboardRequest::new(today);
        blank.city = "   ".to_string();
        assert!(blank.validate(today).is_err());

        let mut past = DashboardRequest::new(today);
        past.prediction_date = today;
        let err = past.validate(today).unwrap_err();
        assert!(err.to_string().contains("on or after 2024-06-02"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Atmospheric view".parse::<ViewMode>().unwrap(), ViewMode::AtmosphericView);
        assert_eq!("ABOUT".parse::<ViewMode>().unwrap(), ViewMode::About);
        assert!("map".parse::<ViewMode>().is_err());
        assert_eq!("history".parse::<DroneMode>().unwrap(), DroneMode::DataHistory);
        assert_eq!("off".parse::<DroneMode>().unwrap(), DroneMode::Disabled);
    }

    #[tokio::test]
    async fn test_navigator_fetches_now_then_prediction() {
        let weather = Arc::new(RecordingWeather::default());
        let dashboard = dashboard(Some(chennai()), weather.clone());
        let request = DashboardRequest::new(now().date_naive());

        let view = dashboard.render(&request, now()).await.unwrap();

        let queries = weather.queries.lock().unwrap().clone();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].timestamp, now());
        assert_eq!(queries[1].timestamp, request.prediction_datetime());
        assert_eq!(queries[0].location, chennai());

        let DashboardContent::Navigator { live, forecast, .. } = view.content else {
            panic!("expected navigator content");
        };
        let live = live.panel().unwrap();
        assert_eq!(live.value(weather::TEMPERATURE), Some("30.0"));
        assert_eq!(live.value(weather::UV_INDEX), Some("N/A"));
        assert_eq!(live.value(weather::SUNRISE), Some("05:43 AM 2024-06-02 IST"));
        assert_eq!(live.value(weather::SUNSET), Some("N/A"));
        assert_eq!(forecast.panel().unwrap().rows.len(), 6);
    }

    #[tokio::test]
    async fn test_failed_panel_is_omitted_alone() {
        let request = DashboardRequest::new(now().date_naive());
        let weather = Arc::new(RecordingWeather {
            fail_at: vec![request.prediction_datetime()],
            ..Default::default()
        });
        let dashboard = dashboard(Some(chennai()), weather);

        let view = dashboard.render(&request, now()).await.unwrap();
        let DashboardContent::Navigator { live, forecast, .. } = view.content else {
            panic!("expected navigator content");
        };
        assert!(live.panel().is_some());
        assert_eq!(
            forecast.error(),
            Some(&WeatherError::Upstream {
                status: 500,
                body: "boom".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_location_not_found_stops_everything() {
        let weather = Arc::new(RecordingWeather::default());
        let dashboard = dashboard(None, weather.clone());
        let mut request = DashboardRequest::new(now().date_naive());
        request.city = "xyzzyqqq123".to_string();

        let err = dashboard.render(&request, now()).await.unwrap_err();
        assert!(matches!(err, DashboardError::LocationNotFound { .. }));
        assert!(weather.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_about_needs_no_lookup() {
        let weather = Arc::new(RecordingWeather::default());
        let dashboard = dashboard(None, weather.clone());
        let mut request = DashboardRequest::new(now().date_naive());
        request.view = ViewMode::About;

        let view = dashboard.render(&request, now()).await.unwrap();
        assert!(view.location.is_none());
        assert!(matches!(view.content, DashboardContent::About { .. }));
    }

    #[tokio::test]
    async fn test_atmospheric_defaults_to_zoom_two() {
        let weather = Arc::new(RecordingWeather::default());
        let dashboard = dashboard(Some(chennai()), weather.clone());
        let mut request = DashboardRequest::new(now().date_naive());
        request.view = ViewMode::AtmosphericView;

        let view = dashboard.render(&request, now()).await.unwrap();
        let DashboardContent::Atmospheric { zoom, imagery_url, imagery } = view.content else {
            panic!("expected atmospheric content");
        };
        assert_eq!(zoom.level(), 2);
        assert_eq!(imagery.dimensions(), (500, 500));
        assert!(imagery_url.contains("TIME=2024-05-31"));
        assert!(weather.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drone_mode_replaces_weather() {
        let weather = Arc::new(RecordingWeather::default());
        let dashboard = dashboard(Some(chennai()), weather.clone());

        let mut request = DashboardRequest::new(now().date_naive());
        request.drone = DroneMode::DataHistory;
        let view = dashboard.render(&request, now()).await.unwrap();
        let DashboardContent::DroneHistory { samples } = view.content else {
            panic!("expected drone history");
        };
        assert_eq!(samples.len(), 50);
        assert_eq!(samples.last().unwrap().timestamp, now());

        request.drone = DroneMode::Conditions;
        let view = dashboard.render(&request, now()).await.unwrap();
        assert!(matches!(
            view.content,
            DashboardContent::DroneConditions { latest: Some(_) }
        ));
        assert!(weather.queries.lock().unwrap().is_empty());
    }
}
