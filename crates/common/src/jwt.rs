//! Pre-verification JWT helpers.
//!
//! Identity provider tokens are RS256-signed and carry a `kid` header naming
//! the JWKS key that verifies them. This module inspects the untrusted
//! header and checks `iat`; signature, `aud` and `iss` are verified in the
//! service crate once the key is known.
//!
//! ```rust,ignore
//! use common::jwt::{extract_kid, validate_iat, DEFAULT_CLOCK_SKEW};
//!
//! let kid = extract_kid(token)?;
//! // ... fetch key, verify signature ...
//! validate_iat(iat, DEFAULT_CLOCK_SKEW)?;
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::time::Duration;
use thiserror::Error;

/// Tokens above this size are rejected before any decoding (8 KiB).
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default tolerance for `iat` values in the future.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Largest configurable `iat` tolerance.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Why a token was rejected before verification.
///
/// Every variant renders the same client message; the variant itself is
/// only for logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtValidationError {
    #[error("Unable to parse authentication token")]
    TokenTooLarge,

    #[error("Unable to parse authentication token")]
    MalformedToken,

    #[error("Unable to parse authentication token")]
    MissingKid,

    #[error("Unable to parse authentication token")]
    IatTooFarInFuture,
}

/// Read `kid` from the unverified header of a compact JWT.
///
/// The value is only a lookup key for the JWKS.
///
/// # Errors
///
/// - `TokenTooLarge` above [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` unless the token is three dot-separated segments
///   whose first decodes to a JSON object
/// - `MissingKid` when `kid` is absent, empty or not a string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(target: "common.jwt", token_size = token.len(), "Token exceeds size limit");
        return Err(JwtValidationError::TokenTooLarge);
    }

    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!(target: "common.jwt", "Token is not a three-segment JWT");
        return Err(JwtValidationError::MalformedToken);
    };

    let decoded = URL_SAFE_NO_PAD.decode(header).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "JWT header is not base64url");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&decoded)
        .map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "JWT header is not a JSON object");
            JwtValidationError::MalformedToken
        })?;

    match header.get("kid").and_then(serde_json::Value::as_str) {
        Some(kid) if !kid.is_empty() => Ok(kid.to_string()),
        _ => Err(JwtValidationError::MissingKid),
    }
}

/// Reject an `iat` more than `clock_skew` ahead of the current time.
///
/// # Errors
///
/// `JwtValidationError::IatTooFarInFuture`.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    check_iat(iat, clock_skew, chrono::Utc::now().timestamp())
}

fn check_iat(iat: i64, clock_skew: Duration, now: i64) -> Result<(), JwtValidationError> {
    let skew = i64::try_from(clock_skew.as_secs()).unwrap_or(i64::MAX);
    let latest = now.saturating_add(skew);

    if iat > latest {
        tracing::debug!(target: "common.jwt", iat, latest, "Token issued in the future");
        return Err(JwtValidationError::IatTooFarInFuture);
    }
    Ok(())
}
