use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    DashboardError,
    dashboard::{Dashboard, DashboardRequest, DashboardView},
    imagery::ImageryUrlBuilder,
    models::{ImageryRequest, Location, SampleTelemetryPoint, ZoomLevel},
    telemetry,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub imagery: ImageryUrlBuilder,
    pub samples: usize,
}

/// Error response: status from the error kind, body carries the user message
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DashboardError::Validation { .. } => StatusCode::BAD_REQUEST,
            DashboardError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            DashboardError::Config { .. } | DashboardError::Telemetry { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub view: Option<String>,
    pub city: Option<String>,
    pub date: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`, UTC
    pub time: Option<String>,
    pub drone: Option<String>,
    pub zoom: Option<i64>,
}

impl DashboardParams {
    /// Fill unset fields from the defaults for `today`
    pub fn into_request(self, today: NaiveDate) -> Result<DashboardRequest, DashboardError> {
        let mut request = DashboardRequest::new(today);
        if let Some(view) = self.view {
            request.view = view.parse()?;
        }
        if let Some(city) = self.city {
            request.city = city;
        }
        if let Some(date) = self.date {
            request.prediction_date = date;
        }
        if let Some(time) = self.time {
            request.prediction_time = parse_time_of_day(&time)?;
        }
        if let Some(drone) = self.drone {
            request.drone = drone.parse()?;
        }
        request.zoom = self.zoom.map(ZoomLevel::or_default);
        Ok(request)
    }
}

pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, DashboardError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| {
            DashboardError::validation(format!("Invalid time of day '{raw}', expected HH:MM"))
        })
}

#[derive(Debug, Deserialize)]
pub struct ImageryParams {
    pub lat: f64,
    pub lon: f64,
    pub zoom: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ImageryResponse {
    pub url: String,
    pub request: ImageryRequest,
}

#[derive(Debug, Deserialize)]
pub struct TelemetryParams {
    pub samples: Option<usize>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(get_dashboard))
        .route("/imagery", get(get_imagery))
        .route("/telemetry", get(get_telemetry))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardView>, ApiError> {
    let now = Utc::now();
    let request = params.into_request(now.date_naive())?;
    let view = state.dashboard.render(&request, now).await?;
    Ok(Json(view))
}

async fn get_imagery(
    State(state): State<AppState>,
    Query(params): Query<ImageryParams>,
) -> Result<Json<ImageryResponse>, ApiError> {
    let location = Location::try_new(params.lat, params.lon, String::new())?;
    let zoom = params.zoom.map(ZoomLevel::or_default).unwrap_or_default();
    let request = state.imagery.request(&location, zoom, Utc::now());
    Ok(Json(ImageryResponse {
        url: state.imagery.url(&request),
        request,
    }))
}

async fn get_telemetry(
    State(state): State<AppState>,
    Query(params): Query<TelemetryParams>,
) -> Result<Json<Vec<SampleTelemetryPoint>>, ApiError> {
    let samples = params.samples.unwrap_or(state.samples);
    Ok(Json(telemetry::generate(samples, Utc::now())?))
}
