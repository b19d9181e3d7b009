//! API command - runs the API server only (no UI)

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::{bootstrap, build_socket_addr, shutdown_signal};
use crate::api::create_router_with_state;
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};

/// Run the API-only server
pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap();

    let state = crate::create_app_state_with_config(&config).await?;
    let app = create_api_router(state, &config);

    let addr = build_socket_addr(&config.server.host, config.server.port)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server shutdown complete");
    Ok(())
}

/// API routes plus the Prometheus endpoint when enabled
pub(crate) fn create_api_router(state: AppState, config: &AppConfig) -> Router {
    let router = create_router_with_state(state);

    match init_metrics(&config.metrics) {
        Some(metrics) => router.merge(create_metrics_router(metrics, &config.metrics.route())),
        None => router,
    }
}
