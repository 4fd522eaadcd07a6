//! HTTP middleware.
//!
//! - `auth` - resolves the bearer token to an authenticated user
//! - `http_metrics` - request counters and latency histograms

pub mod auth;
pub mod http_metrics;

pub use auth::{require_user, AuthState, AuthenticatedUser};
pub use http_metrics::http_metrics_middleware;
