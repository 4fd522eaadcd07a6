//! Gateway authorizer endpoint.

use crate::authorizer::policy::PolicyResponse;
use crate::authorizer::{authorize, AuthorizerEvent};
use crate::errors::TmError;
use crate::routes::AppState;
use crate::schema::SchemaError;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/authorize
///
/// Accepts `{"headers": {"Authorization": "Bearer ..."}, "methodArn": "..."}`
/// and returns the IAM policy for the token's subject. Every token failure
/// is a 401 carrying the reason.
#[instrument(skip_all, name = "tm.handlers.authorize")]
pub async fn authorize_request(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PolicyResponse>, TmError> {
    let event: AuthorizerEvent =
        serde_json::from_slice(&body).map_err(|_| SchemaError::NotAnObject)?;

    let policy = authorize(&state.jwt_validator, &event).await.map_err(|e| {
        tracing::debug!(target: "tm.handlers.authorize", error = %e, "Authorization denied");
        TmError::from(e)
    })?;

    Ok(Json(policy))
}
