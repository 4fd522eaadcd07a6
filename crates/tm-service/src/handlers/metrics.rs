//! Prometheus metrics endpoint.
//!
//! Unauthenticated so the scraper can reach it. Labels carry no user data.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics.
///
/// ```text
/// # TYPE tm_http_requests_total counter
/// tm_http_requests_total{method="GET",endpoint="/v1/brokers",status_code="200"} 42
/// ```
#[tracing::instrument(skip_all, name = "tm.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
