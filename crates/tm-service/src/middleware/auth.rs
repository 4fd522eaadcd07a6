//! Authentication middleware for protected routes.
//!
//! Resolves the bearer token to a row of `users` and injects an
//! [`AuthenticatedUser`] into request extensions.

use crate::auth::jwt::JwtValidator;
use crate::auth::subject::Subject;
use crate::auth::AuthError;
use crate::errors::TmError;
use crate::repositories::UsersRepository;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use common::bearer::parse_bearer;
use common::types::UserUid;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

const UNAUTHORIZED: &str = "Unauthorized";

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_validator: Arc<JwtValidator>,
    pub pool: PgPool,
}

/// The caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Internal `users.id`; scopes every query.
    pub id: i64,
    pub uid: UserUid,
    /// Identity provider prefix of the token subject, possibly empty.
    pub provider: String,
}

/// Require a valid token whose subject names a known user.
///
/// # Response
///
/// - 401 `Unauthorized` when the header is missing, the token is invalid,
///   the subject is not a UUID, or no such user exists
/// - 503 when the key set cannot be fetched
#[instrument(skip_all, name = "tm.middleware.auth")]
pub async fn require_user(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, TmError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = parse_bearer(header).map_err(|e| {
        tracing::debug!(target: "tm.middleware.auth", error = %e, "Rejected authorization header");
        unauthorized()
    })?;

    let claims = state
        .jwt_validator
        .validate(token)
        .await
        .map_err(|e| match e {
            unavailable @ AuthError::JwksUnavailable(_) => TmError::from(unavailable),
            other => {
                tracing::debug!(target: "tm.middleware.auth", error = %other, "Token rejected");
                unauthorized()
            }
        })?;

    let subject = Subject::parse(&claims.sub);
    let uid = UserUid::parse(&subject.user_uuid).ok_or_else(|| {
        tracing::debug!(target: "tm.middleware.auth", "Subject is not a user uuid");
        unauthorized()
    })?;

    let user = UsersRepository::find_by_uid(&state.pool, uid)
        .await?
        .ok_or_else(|| {
            tracing::debug!(target: "tm.middleware.auth", "No user for subject");
            unauthorized()
        })?;

    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        uid,
        provider: subject.provider,
    });

    Ok(next.run(req).await)
}

fn unauthorized() -> TmError {
    TmError::Unauthorized(UNAUTHORIZED.to_string())
}
