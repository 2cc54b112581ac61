pub mod calendar;
pub mod dashboard;
pub mod reports;
pub mod resources;
pub mod views;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use chrono_tz::Tz;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config;
use crate::models::Config;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<Config>,
    pub(crate) timezone: Tz,
}

fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .route("/calendar", get(calendar::calendar_handler))
        .route("/resources/{name}", get(resources::resource_handler))
        .route("/reports", get(reports::reports_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn serve(config: Config, config_path: &Path, addr: &str) -> Result<()> {
    let timezone = config::timezone(&config)?;
    let static_dir = config_path
        .parent()
        .unwrap_or(Path::new("."))
        .join("static");
    info!(
        "Backend: {}, static files: {}",
        config.api.base_url,
        static_dir.display()
    );
    let state = AppState {
        config: Arc::new(config),
        timezone,
    };

    let app = router(state, &static_dir);

    let listener = TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
