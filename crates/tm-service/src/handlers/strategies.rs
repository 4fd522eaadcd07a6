//! Strategy handlers.

use crate::errors::TmError;
use crate::middleware::AuthenticatedUser;
use crate::models::{CreatedResponse, StrategyListResponse, StrategyResponse};
use crate::repositories::StrategiesRepository;
use crate::routes::AppState;
use crate::schema::{parse_object, StrategyPayload};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::types::StrategyUid;
use std::sync::Arc;
use tracing::instrument;

fn strategy_not_found() -> TmError {
    TmError::NotFound("Strategy not found".to_string())
}

#[instrument(skip_all, name = "tm.handlers.create_strategy")]
pub async fn create_strategy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), TmError> {
    let payload = StrategyPayload::from_body(&parse_object(&body)?)?;

    let uid = StrategiesRepository::create(&state.pool, user.id, &payload.name).await?;

    tracing::info!(target: "tm.handlers.strategies", strategy_uid = %uid, "Strategy created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { uid })))
}

#[instrument(skip_all, name = "tm.handlers.list_strategies")]
pub async fn list_strategies(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<StrategyListResponse>, TmError> {
    let strategies = StrategiesRepository::list(&state.pool, user.id)
        .await?
        .into_iter()
        .map(StrategyResponse::from)
        .collect();

    Ok(Json(StrategyListResponse { strategies }))
}

#[instrument(skip_all, name = "tm.handlers.get_strategy")]
pub async fn get_strategy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<Json<StrategyResponse>, TmError> {
    let uid = StrategyUid::parse(&raw_uid).ok_or_else(strategy_not_found)?;
    let strategy = StrategiesRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(strategy_not_found)?;

    Ok(Json(strategy.into()))
}

/// Rename a strategy. Existence is checked before the body.
#[instrument(skip_all, name = "tm.handlers.update_strategy")]
pub async fn update_strategy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
    body: Bytes,
) -> Result<StatusCode, TmError> {
    let uid = StrategyUid::parse(&raw_uid).ok_or_else(strategy_not_found)?;
    let strategy = StrategiesRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(strategy_not_found)?;

    let payload = StrategyPayload::from_body(&parse_object(&body)?)?;

    StrategiesRepository::update(&state.pool, strategy.id, &payload.name).await?;

    tracing::info!(target: "tm.handlers.strategies", strategy_uid = %uid, "Strategy updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, name = "tm.handlers.delete_strategy")]
pub async fn delete_strategy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<StatusCode, TmError> {
    let uid = StrategyUid::parse(&raw_uid).ok_or_else(strategy_not_found)?;
    if !StrategiesRepository::delete(&state.pool, user.id, uid).await? {
        return Err(strategy_not_found());
    }

    tracing::info!(target: "tm.handlers.strategies", strategy_uid = %uid, "Strategy deleted");
    Ok(StatusCode::NO_CONTENT)
}
