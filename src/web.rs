use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::imagery::ImageryUrlBuilder;

/// Full application router, API mounted under `/api`
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: &DashboardConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState {
        dashboard: Dashboard::from_config(config)?,
        imagery: ImageryUrlBuilder::new(&config.imagery),
        samples: config.telemetry.samples,
    };

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app(state))
        .await
        .context("Web server failed")?;
    Ok(())
}
