//! Prometheus recorder, scrape endpoint and the relay's metric families

use std::sync::LazyLock;
use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use regex::Regex;
use tracing::{error, info};

use super::config::MetricsConfig;

static SESSION_SEGMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/sessions/[^/]+").ok());

static UUID: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}").ok()
});

const MAX_PATH_LABEL_LENGTH: usize = 50;

/// Handle to the installed recorder
#[derive(Clone)]
pub struct PrometheusMetrics(PrometheusHandle);

impl PrometheusMetrics {
    /// Text exposition of every metric recorded so far
    pub fn render(&self) -> String {
        self.0.render()
    }
}

/// Install the global recorder. Returns `None` when disabled or when a
/// recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        info!("Metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("chat_relay_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            info!(path = %config.route(), "Metrics recorder installed");
            Some(PrometheusMetrics(handle))
        }
        Err(e) => {
            error!(error = %e, "Could not install metrics recorder");
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(scrape))
        .with_state(metrics)
}

async fn scrape(State(metrics): State<PrometheusMetrics>) -> String {
    metrics.render()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route_label(path)),
        ("status", status.to_string()),
    ];

    counter!("chat_relay_http_requests_total", &labels).increment(1);
    histogram!("chat_relay_http_request_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

/// How a provider call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Error,
    /// The client went away before a streamed reply finished
    Cancelled,
}

impl CallOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One upstream generation call
pub struct ProviderCall<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    /// `blocking` or `stream`
    pub mode: &'static str,
    pub outcome: CallOutcome,
    pub duration: Duration,
}

pub fn record_llm_request(call: ProviderCall<'_>) {
    let labels = [
        ("provider", call.provider.to_string()),
        ("model", call.model.to_string()),
        ("mode", call.mode.to_string()),
        ("outcome", call.outcome.as_str().to_string()),
    ];

    counter!("chat_relay_provider_requests_total", &labels).increment(1);
    histogram!("chat_relay_provider_request_duration_seconds", &labels)
        .record(call.duration.as_secs_f64());
}

pub fn record_session_configured(provider: &str) {
    counter!("chat_relay_sessions_configured_total", "provider" => provider.to_string())
        .increment(1);
}

/// Session ids and UUIDs collapse to `{id}` so label cardinality stays bounded
fn route_label(path: &str) -> String {
    let mut label = path.to_string();

    if let Some(re) = SESSION_SEGMENT.as_ref() {
        label = re.replace_all(&label, "/sessions/{id}").into_owned();
    }
    if let Some(re) = UUID.as_ref() {
        label = re.replace_all(&label, "{id}").into_owned();
    }

    if label.len() > MAX_PATH_LABEL_LENGTH {
        let cut = (0..=MAX_PATH_LABEL_LENGTH)
            .rev()
            .find(|&i| label.is_char_boundary(i))
            .unwrap_or(0);
        label.truncate(cut);
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_segment_collapsed() {
        assert_eq!(
            route_label("/api/sessions/my-chat/messages"),
            "/api/sessions/{id}/messages"
        );
    }

    #[test]
    fn test_uuid_collapsed() {
        assert_eq!(
            route_label("/ui/550e8400-e29b-41d4-a716-446655440000"),
            "/ui/{id}"
        );
    }

    #[test]
    fn test_plain_route_unchanged() {
        assert_eq!(route_label("/api/chat/stream"), "/api/chat/stream");
    }

    #[test]
    fn test_long_route_truncated_on_char_boundary() {
        let path = format!("/ui/{}", "é".repeat(40));
        let label = route_label(&path);

        assert!(label.len() <= MAX_PATH_LABEL_LENGTH);
        assert!(path.starts_with(&label));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(CallOutcome::Success.as_str(), "success");
        assert_eq!(CallOutcome::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_llm_request(ProviderCall {
            provider: "anthropic",
            model: "claude-3-5-haiku-20241022",
            mode: "stream",
            outcome: CallOutcome::Cancelled,
            duration: Duration::from_millis(500),
        });
        record_session_configured("google");
        record_http_request("POST", "/api/chat", 400, Duration::from_millis(3));
    }
}
