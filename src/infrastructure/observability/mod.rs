//! Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_http_request, record_llm_request,
    record_session_configured, CallOutcome, PrometheusMetrics, ProviderCall,
};
