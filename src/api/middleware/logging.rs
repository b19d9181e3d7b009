//! Access logging

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, warn};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headers worth logging; `true` marks credentials that are logged as present only
const LOGGED_HEADERS: &[(&str, bool)] = &[
    ("content-type", false),
    ("content-length", false),
    ("accept", false),
    ("user-agent", false),
    ("x-forwarded-for", false),
    ("authorization", true),
    ("x-api-key", true),
    ("x-goog-api-key", true),
    ("cookie", true),
];

/// One line when a request arrives, one when its response head is ready.
///
/// For `/api/chat/stream` the second line is written before the body has
/// finished streaming.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let route = route_of(&request);
    let request_id = request_id(request.headers());

    debug!(
        %method,
        %route,
        %request_id,
        headers = %loggable_headers(request.headers()),
        "Incoming request"
    );

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %route, %request_id, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        info!(%method, %route, %request_id, status = status.as_u16(), elapsed_ms, "Request handled");
    }

    response
}

fn route_of(request: &Request<Body>) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    }
}

/// Set by `SetRequestIdLayer`; generated here only when the middleware runs without it
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn loggable_headers(headers: &HeaderMap) -> String {
    LOGGED_HEADERS
        .iter()
        .filter_map(|&(name, secret)| {
            let value = headers.get(name)?;
            let shown = if secret {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            Some(format!("{}={}", name, shown))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
