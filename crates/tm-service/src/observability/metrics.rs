//! Metrics definitions for the Trades Management service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `tm_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP verbs
//! - `endpoint`: route templates, UUID segments replaced with `{uuid}`
//! - `status`: success, error, timeout
//! - `operation`: fixed repository operation names
//! - `result`: fixed validation outcomes

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Resource collections served under `/v1`.
const COLLECTIONS: [&str; 4] = ["brokers", "accounts", "strategies", "trades"];

/// Initialize the Prometheus recorder and return the handle used by
/// `GET /metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("tm_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("tm_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `tm_http_requests_total`, `tm_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("tm_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("tm_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto its route template.
///
/// `/v1/trades/6a2f41a3-c54c-fce8-32d2-0324e1c32e22` becomes
/// `/v1/trades/{uuid}`. Anything unrecognised becomes `/other`.
pub(crate) fn normalize_endpoint(path: &str) -> String {
    match path {
        "/health" | "/ready" | "/metrics" | "/v1/authorize" | "/v1/users/me" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

fn normalize_dynamic_endpoint(path: &str) -> String {
    let parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    // ["", "v1", collection] or ["", "v1", collection, uuid]
    if let (Some(&""), Some(&"v1"), Some(collection)) = (parts.first(), parts.get(1), parts.get(2))
    {
        if COLLECTIONS.contains(collection) {
            match parts.get(3) {
                None if parts.len() == 3 => return format!("/v1/{collection}"),
                Some(segment) if parts.len() == 4 && uuid::Uuid::parse_str(segment).is_ok() => {
                    return format!("/v1/{collection}/{{uuid}}");
                }
                _ => {}
            }
        }
    }

    "/other".to_string()
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record a repository query.
///
/// Metric: `tm_db_query_duration_seconds`, `tm_db_queries_total`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &str, status: &str, duration: Duration) {
    histogram!("tm_db_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("tm_db_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record a JWT validation outcome.
///
/// Metric: `tm_jwt_validations_total`
/// Labels: `result` (success, expired, claims, key_not_found, malformed, unavailable)
pub fn record_jwt_validation(result: &str) {
    counter!("tm_jwt_validations_total",
        "result" => result.to_string()
    )
    .increment(1);
}

/// Record a JWKS fetch.
///
/// Metric: `tm_jwks_fetch_total`
/// Labels: `status` (success, error)
pub fn record_jwks_fetch(status: &str) {
    counter!("tm_jwks_fetch_total",
        "status" => status.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run against the global no-op recorder; they exercise the
    // recording paths without asserting values.

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, Duration::from_millis(5));
        record_http_request("POST", "/v1/brokers", 201, Duration::from_millis(20));
        record_http_request(
            "DELETE",
            "/v1/accounts/6a2f41a3-c54c-fce8-32d2-0324e1c32e22",
            400,
            Duration::from_millis(8),
        );
        record_http_request("GET", "/v1/trades", 504, Duration::from_secs(30));
    }

    #[test]
    fn test_record_db_and_auth_metrics() {
        record_db_query("insert_broker", "success", Duration::from_millis(3));
        record_db_query("list_accounts", "error", Duration::from_millis(1));
        record_jwt_validation("success");
        record_jwt_validation("expired");
        record_jwks_fetch("error");
    }

    #[test]
    fn test_metric_names_are_recorded() {
        use metrics_util::debugging::DebuggingRecorder;

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_http_request("GET", "/v1/brokers", 200, Duration::from_millis(4));
            record_db_query("list_brokers", "success", Duration::from_millis(2));
            record_jwt_validation("success");
            record_jwks_fetch("success");
        });

        let names: Vec<String> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(key, _, _, _)| key.key().name().to_string())
            .collect();

        for expected in [
            "tm_http_requests_total",
            "tm_http_request_duration_seconds",
            "tm_db_queries_total",
            "tm_db_query_duration_seconds",
            "tm_jwt_validations_total",
            "tm_jwks_fetch_total",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(201), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(401), "error");
        assert_eq!(categorize_status_code(404), "error");
        assert_eq!(categorize_status_code(503), "error");
    }

    #[test]
    fn test_normalize_endpoint_known_paths() {
        assert_eq!(normalize_endpoint("/health"), "/health");
        assert_eq!(normalize_endpoint("/ready"), "/ready");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
        assert_eq!(normalize_endpoint("/v1/authorize"), "/v1/authorize");
        assert_eq!(normalize_endpoint("/v1/users/me"), "/v1/users/me");
    }

    #[test]
    fn test_normalize_endpoint_collections() {
        assert_eq!(normalize_endpoint("/v1/brokers"), "/v1/brokers");
        assert_eq!(normalize_endpoint("/v1/accounts/"), "/v1/accounts");
        assert_eq!(normalize_endpoint("/v1/strategies"), "/v1/strategies");
        assert_eq!(normalize_endpoint("/v1/trades"), "/v1/trades");
    }

    #[test]
    fn test_normalize_endpoint_uuid_segments() {
        assert_eq!(
            normalize_endpoint("/v1/brokers/550e8400-e29b-41d4-a716-446655440000"),
            "/v1/brokers/{uuid}"
        );
        assert_eq!(
            normalize_endpoint("/v1/trades/6a2f41a3-c54c-fce8-32d2-0324e1c32e22"),
            "/v1/trades/{uuid}"
        );
    }

    #[test]
    fn test_normalize_endpoint_unknown_paths() {
        assert_eq!(normalize_endpoint("/"), "/other");
        assert_eq!(normalize_endpoint("/v2/brokers"), "/other");
        assert_eq!(normalize_endpoint("/v1/positions"), "/other");
        assert_eq!(normalize_endpoint("/v1/brokers/not-a-uuid"), "/other");
        assert_eq!(
            normalize_endpoint("/v1/brokers/550e8400-e29b-41d4-a716-446655440000/extra"),
            "/other"
        );
    }
}
