//! HTTP routes for the Trades Management service.
//!
//! Defines the Axum router and application state.

use crate::auth::jwks::JwksClient;
use crate::auth::jwt::JwtValidator;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_user, AuthState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// RS256 validator shared by the auth middleware and the authorizer.
    pub jwt_validator: Arc<JwtValidator>,
}

impl AppState {
    /// Assemble state, wiring a JWKS client and validator from `config`.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let jwks_client = Arc::new(JwksClient::with_ttl(
            config.jwks_url(),
            Duration::from_secs(config.jwks_cache_ttl_seconds),
        ));
        let jwt_validator = Arc::new(JwtValidator::new(
            jwks_client,
            config.api_audience.clone(),
            config.issuer(),
            config.jwt_clock_skew_seconds,
        ));

        Self {
            pool,
            config,
            jwt_validator,
        }
    }
}

/// Build the application routes.
///
/// - `/health`, `/ready`, `/metrics` - public, unversioned
/// - `/v1/authorize` - public; the token is in the body
/// - `/v1/users/me`, `/v1/brokers`, `/v1/accounts`, `/v1/strategies`,
///   `/v1/trades` - require a known user
/// - TraceLayer, 30 second timeout, HTTP metrics (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        jwt_validator: state.jwt_validator.clone(),
        pool: state.pool.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/v1/authorize", post(handlers::authorize_request))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/v1/users/me", get(handlers::get_me))
        .route(
            "/v1/brokers",
            get(handlers::list_brokers).post(handlers::create_broker),
        )
        .route(
            "/v1/brokers/:uid",
            get(handlers::get_broker)
                .put(handlers::update_broker)
                .delete(handlers::delete_broker),
        )
        .route(
            "/v1/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/v1/accounts/:uid",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route(
            "/v1/strategies",
            get(handlers::list_strategies).post(handlers::create_strategy),
        )
        .route(
            "/v1/strategies/:uid",
            get(handlers::get_strategy)
                .put(handlers::update_strategy)
                .delete(handlers::delete_strategy),
        )
        .route(
            "/v1/trades",
            get(handlers::list_trades).post(handlers::create_trade),
        )
        .route(
            "/v1/trades/:uid",
            get(handlers::get_trade)
                .put(handlers::update_trade)
                .delete(handlers::delete_trade),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TraceLayer (innermost)
    // 2. TimeoutLayer
    // 3. http_metrics_middleware, so 404/405/408 are counted too
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
