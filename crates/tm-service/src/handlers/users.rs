//! Current user handler.

use crate::errors::TmError;
use crate::middleware::AuthenticatedUser;
use crate::models::UserResponse;
use crate::repositories::UsersRepository;
use crate::routes::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /v1/users/me
///
/// ```json
/// {
///   "uid": "3f2504e0-4f89-41d3-9a0c-0305e82c3301",
///   "name": "Ada",
///   "email": "ada@example.com",
///   "risk": 2,
///   "confirmed_at": null,
///   "created_at": "2024-01-01T00:00:00Z"
/// }
/// ```
#[instrument(skip_all, name = "tm.handlers.get_me")]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, TmError> {
    let row = UsersRepository::find_by_uid(&state.pool, user.uid)
        .await?
        .ok_or_else(|| TmError::NotFound("User not found".to_string()))?;

    Ok(Json(row.into()))
}
