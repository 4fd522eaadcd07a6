//! Trades Management Service Library
//!
//! A stateless HTTP service over PostgreSQL that manages a user's brokers,
//! accounts, strategies and trades, plus an RS256/JWKS authorizer that
//! issues gateway access policies.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs -> handlers/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - JWKS client, RS256 validation, subject parsing
//! - `authorizer` - gateway authorizer and IAM policy builder
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and HTTP metrics
//! - `models` - Rows and response bodies
//! - `observability` - Prometheus metrics
//! - `repositories` - SQL, scoped by user
//! - `routes` - Axum router setup
//! - `schema` - Request body validation

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod schema;
