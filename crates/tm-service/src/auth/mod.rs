//! Bearer token authentication against the identity provider.

pub mod claims;
pub mod jwks;
pub mod jwt;
pub mod subject;

use crate::errors::TmError;
use common::bearer::BearerError;
use common::jwt::JwtValidationError;
use thiserror::Error;

/// Authentication failures. `Display` is the message returned to clients.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Bearer(#[from] BearerError),

    #[error("Unable to find appropriate key")]
    KeyNotFound,

    #[error("token is expired")]
    Expired,

    #[error("please check the audience and issuer")]
    ClaimsMismatch,

    #[error("Unable to parse authentication token")]
    Malformed,

    #[error("Key set unavailable: {0}")]
    JwksUnavailable(String),
}

impl AuthError {
    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            AuthError::Bearer(_) | AuthError::Malformed => "malformed",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::Expired => "expired",
            AuthError::ClaimsMismatch => "claims",
            AuthError::JwksUnavailable(_) => "unavailable",
        }
    }
}

impl From<JwtValidationError> for AuthError {
    fn from(_: JwtValidationError) -> Self {
        AuthError::Malformed
    }
}

impl From<AuthError> for TmError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::JwksUnavailable(reason) => TmError::ServiceUnavailable(reason),
            other => TmError::Unauthorized(other.to_string()),
        }
    }
}
