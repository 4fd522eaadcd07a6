//! Gateway authorizer: turns a bearer token into an access policy.

pub mod policy;

use crate::auth::jwt::JwtValidator;
use crate::auth::subject::Subject;
use crate::auth::AuthError;
use crate::errors::TmError;
use common::bearer::parse_bearer;
use policy::{AuthPolicy, PolicyError, PolicyResponse};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::instrument;

/// Token authorizer request as forwarded by the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub method_arn: String,
}

impl AuthorizerEvent {
    /// The `Authorization` header, matched case-insensitively.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl From<AuthorizeError> for TmError {
    fn from(err: AuthorizeError) -> Self {
        match err {
            AuthorizeError::Auth(e) => e.into(),
            AuthorizeError::Policy(e) => TmError::Unauthorized(e.to_string()),
        }
    }
}

/// Validate the event's bearer token and allow every method of the API for
/// its subject.
///
/// The policy context carries `sub` (the provider prefix of the subject)
/// and `user_uuid`.
#[instrument(skip_all, name = "tm.authorizer.authorize")]
pub async fn authorize(
    validator: &JwtValidator,
    event: &AuthorizerEvent,
) -> Result<PolicyResponse, AuthorizeError> {
    let token = parse_bearer(event.authorization()).map_err(AuthError::from)?;
    let claims = validator.validate(token).await?;
    let subject = Subject::parse(&claims.sub);

    let mut policy = AuthPolicy::new(&claims.sub, &event.method_arn)?
        .with_context("sub", subject.provider)
        .with_context("user_uuid", subject.user_uuid);
    policy.allow_all_methods()?;

    tracing::debug!(target: "tm.authorizer", "Policy issued");
    Ok(policy.build()?)
}
