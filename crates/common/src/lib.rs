//! Common utilities shared across Trades Management components.

#![warn(clippy::pedantic)]

/// Module for parsing `Authorization: Bearer` headers
pub mod bearer;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, header inspection, `iat` checks)
pub mod jwt;

/// Module for typed public record identifiers
pub mod types;
