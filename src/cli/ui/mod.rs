//! UI command - serves the chat UI with an optional API proxy

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderName, Request, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{any, get};
use axum::Router;
use clap::Args;
use futures::TryStreamExt;
use reqwest::Client;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::serve::{static_files, UI_PREFIX};
use super::{bootstrap, build_socket_addr, shutdown_signal};

/// Arguments for the UI command
#[derive(Args, Clone)]
pub struct UiArgs {
    /// API URL to proxy `/api/*` requests to
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Skip proxying - serve static files only
    #[arg(long)]
    pub skip_proxy: bool,

    /// Port to serve UI on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Run the UI server
pub async fn run(args: UiArgs) -> anyhow::Result<()> {
    let config = bootstrap();

    let app = create_ui_router(&args);

    let port = args.port.unwrap_or(config.server.port);
    let addr = build_socket_addr(&config.server.host, port)?;

    if args.skip_proxy {
        info!("Starting UI server on {} (static files only)", addr);
    } else {
        info!(
            "Starting UI server on {} (proxying /api/* to {})",
            addr, args.api_url
        );
    }

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// UI at `/ui`, `/` redirecting there, and `/api/*` forwarded unless disabled
fn create_ui_router(args: &UiArgs) -> Router {
    let router = Router::new()
        .route("/", get(|| async { Redirect::temporary("/ui/") }))
        .nest_service(UI_PREFIX, static_files());

    if args.skip_proxy {
        return router;
    }

    let proxy_state = ProxyState {
        api_url: args.api_url.trim_end_matches('/').to_string(),
        client: Client::new(),
    };

    router.merge(
        Router::new()
            .route("/api/{*path}", any(proxy_handler))
            .with_state(proxy_state),
    )
}

#[derive(Clone)]
struct ProxyState {
    api_url: String,
    client: Client,
}

/// Connection-scoped headers that must not cross the proxy
const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

async fn proxy_handler(State(state): State<ProxyState>, req: Request<Body>) -> Response {
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path(), |pq| pq.as_str());
    let target = format!("{}{}", state.api_url, path);

    match forward(&state.client, req, &target).await {
        Ok(response) => response,
        Err(e) => {
            error!(%target, error = %e, "API proxy failed");
            (StatusCode::BAD_GATEWAY, format!("Proxy error: {}", e)).into_response()
        }
    }
}

/// Forward the request and relay the upstream body as it arrives
async fn forward(client: &Client, req: Request<Body>, target: &str) -> anyhow::Result<Response> {
    let (parts, body) = req.into_parts();

    let mut outbound = client.request(parts.method.clone(), target);
    for (name, value) in parts.headers.iter() {
        if !HOP_BY_HOP.contains(name) {
            outbound = outbound.header(name, value);
        }
    }
    // request bodies are small JSON documents; only responses need streaming
    let body = axum::body::to_bytes(body, usize::MAX).await?;
    if !body.is_empty() {
        outbound = outbound.body(body);
    }

    let upstream = outbound.send().await?;

    let mut response = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers().iter() {
        // re-chunked below, so upstream framing does not apply
        let framing = name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING;
        if !framing && !HOP_BY_HOP.contains(name) {
            response = response.header(name, value);
        }
    }

    let body = Body::from_stream(upstream.bytes_stream().map_err(std::io::Error::other));
    Ok(response.body(body)?)
}
