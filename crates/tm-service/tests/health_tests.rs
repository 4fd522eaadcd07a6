//! Operational endpoint integration tests.
//!
//! Covers `/health`, `/ready` and `/metrics` using the `TestTmServer` harness.

use sqlx::PgPool;
use tm_test_utils::TestTmServer;

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_endpoint_returns_ok(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ready_endpoint_checks_database(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");
    assert!(body.get("error").is_none());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ready_endpoint_reports_closed_pool(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool.clone()).await?;
    pool.close().await;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["error"], "Service dependencies unavailable");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_metrics_endpoint_renders_prometheus_text(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    let response = client
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let text = response.text().await?;
    assert!(
        text.contains("tm_http_requests_total"),
        "expected request counter in metrics output"
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_route_returns_404(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestTmServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/v1/nonexistent", server.url())).await?;

    assert_eq!(response.status(), 404);

    Ok(())
}
