//! Test server harness for E2E testing
//!
//! Provides `TestTmServer` for spawning real service instances in tests.

use crate::api_client::TestApi;
use crate::jwks_mock::MockJwks;
use crate::test_ids::{subject_for, TEST_AUDIENCE};
use crate::token_builders::TestTokenBuilder;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tm_service::config::Config;
use tm_service::observability::metrics::init_metrics_recorder;
use tm_service::routes::{self, AppState};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// The global recorder can only be installed once per process.
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Test harness for spawning the Trades Management server in E2E tests.
///
/// Each server gets its own JWKS mock publishing the primary fixture key.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_health_flow_e2e(pool: PgPool) -> Result<()> {
///     let server = TestTmServer::spawn(pool).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTmServer {
    addr: SocketAddr,
    pool: PgPool,
    config: Config,
    jwks: MockJwks,
    _handle: JoinHandle<()>,
}

impl TestTmServer {
    /// Spawn a server backed by `pool` and a healthy JWKS mock.
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        Self::spawn_with_jwks(pool, MockJwks::start().await).await
    }

    /// Spawn a server that trusts the given JWKS mock.
    pub async fn spawn_with_jwks(pool: PgPool, jwks: MockJwks) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("JWKS_DOMAIN".to_string(), jwks.base_url()),
            ("API_AUDIENCE".to_string(), TEST_AUDIENCE.to_string()),
            ("TM_DRAIN_SECONDS".to_string(), "0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(AppState::new(pool.clone(), config.clone()));
        let app = routes::build_routes(state, metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            jwks,
            _handle: handle,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Issuer the server accepts.
    pub fn issuer(&self) -> String {
        self.jwks.issuer()
    }

    /// Token builder preset with this server's issuer.
    pub fn token(&self) -> TestTokenBuilder {
        TestTokenBuilder::new(&self.issuer())
    }

    /// A valid bearer token for `user`.
    pub fn token_for(&self, user: Uuid) -> String {
        self.token().for_subject(&subject_for(user)).sign()
    }

    /// Client authenticated as `user`.
    pub fn api_for(&self, user: Uuid) -> TestApi {
        TestApi::new(self.url(), self.token_for(user))
    }
}

impl Drop for TestTmServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_server_spawns_successfully(pool: PgPool) -> Result<(), anyhow::Error> {
        let server = TestTmServer::spawn(pool).await?;

        assert!(server.url().starts_with("http://127.0.0.1:"));

        let response = reqwest::get(format!("{}/health", server.url())).await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await?, "OK");

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_server_issuer_matches_config(pool: PgPool) -> Result<(), anyhow::Error> {
        let server = TestTmServer::spawn(pool).await?;

        assert_eq!(server.issuer(), server.config().issuer());
        assert_eq!(server.config().api_audience, TEST_AUDIENCE);

        Ok(())
    }
}
