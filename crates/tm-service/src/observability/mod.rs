//! Observability for the Trades Management service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
