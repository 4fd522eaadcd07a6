//! # TM Test Utilities
//!
//! Shared test utilities for the Trades Management service.
//!
//! This crate provides:
//! - Deterministic RSA fixtures (fixed keys and their JWK components)
//! - A wiremock-backed JWKS endpoint
//! - Token builders signing RS256 access tokens
//! - Fixed test IDs
//! - Database seeders for records the API cannot create
//! - Server test harness (`TestTmServer` for E2E tests)
//! - An authenticated client (`TestApi`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tm_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> anyhow::Result<()> {
//!     let server = TestTmServer::spawn(pool).await?;
//!     seed_user(server.pool(), TEST_USER_ALICE).await?;
//!
//!     let response = server.api_for(TEST_USER_ALICE).get("/v1/brokers").await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod api_client;
pub mod crypto_fixtures;
pub mod fixtures;
pub mod jwks_mock;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

pub use api_client::*;
pub use crypto_fixtures::*;
pub use fixtures::*;
pub use jwks_mock::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
