//! Serve command - runs API + UI combined on the same port

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use super::api::create_api_router;
use super::{bootstrap, build_socket_addr, shutdown_signal};
use crate::api::state::AppState;
use crate::config::AppConfig;

pub(crate) const PUBLIC_DIR: &str = "public";
pub(crate) const UI_PREFIX: &str = "/ui";

/// Run the combined API + UI server
pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap();

    let state = crate::create_app_state_with_config(&config).await?;
    let app = create_router_with_ui(state, &config);

    let addr = build_socket_addr(&config.server.host, config.server.port)?;
    info!("Starting server (API + UI) on {}, UI at /ui/", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// API router with the static UI mounted at `/ui`
fn create_router_with_ui(state: AppState, config: &AppConfig) -> Router {
    create_api_router(state, config).nest_service(UI_PREFIX, static_files())
}

/// The UI bundle, falling back to the index page for unknown paths
pub(crate) fn static_files() -> ServeDir<ServeFile> {
    let index = format!("{}/index.html", PUBLIC_DIR);
    ServeDir::new(PUBLIC_DIR).fallback(ServeFile::new(index))
}
