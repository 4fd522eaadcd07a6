//! Trade handlers.
//!
//! A trade belongs to one of the caller's accounts for its whole life; the
//! strategy reference is optional and may change on update.

use crate::errors::TmError;
use crate::handlers::{check_query_params, filter_param, invalid_query_parameter};
use crate::middleware::AuthenticatedUser;
use crate::models::{CreatedResponse, TradeListResponse, TradeResponse};
use crate::repositories::trades::TradeFilter;
use crate::repositories::{AccountsRepository, StrategiesRepository, TradesRepository};
use crate::routes::AppState;
use crate::schema::{parse_object, TradePayload};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::types::{AccountUid, StrategyUid, TradeUid};
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

const LIST_PARAMS: &[&str] = &["account_uid", "strategy_uid"];

fn trade_not_found() -> TmError {
    TmError::NotFound("Trade not found".to_string())
}

/// Resolve the optional `strategy_uid` of a body to the caller's strategy id.
async fn resolve_strategy(
    pool: &PgPool,
    user_id: i64,
    body: &Map<String, Value>,
) -> Result<Option<i64>, TmError> {
    let invalid = || TmError::BadRequest("Invalid strategy".to_string());

    let raw = match body.get("strategy_uid") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) => raw,
        Some(_) => return Err(invalid()),
    };

    let uid = StrategyUid::parse(raw).ok_or_else(invalid)?;
    let strategy = StrategiesRepository::find(pool, user_id, uid)
        .await?
        .ok_or_else(invalid)?;

    Ok(Some(strategy.id))
}

#[instrument(skip_all, name = "tm.handlers.create_trade")]
pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), TmError> {
    let invalid_account = || TmError::BadRequest("Invalid account".to_string());

    let body = parse_object(&body)?;

    let account_uid = body
        .get("account_uid")
        .and_then(Value::as_str)
        .and_then(AccountUid::parse)
        .ok_or_else(invalid_account)?;
    let account = AccountsRepository::find(&state.pool, user.id, account_uid)
        .await?
        .ok_or_else(invalid_account)?;

    let strategy_id = resolve_strategy(&state.pool, user.id, &body).await?;
    let payload = TradePayload::from_body(&body)?;

    let uid =
        TradesRepository::create(&state.pool, user.id, account.id, strategy_id, &payload).await?;

    tracing::info!(target: "tm.handlers.trades", trade_uid = %uid, "Trade created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { uid })))
}

#[instrument(skip_all, name = "tm.handlers.list_trades")]
pub async fn list_trades(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TradeListResponse>, TmError> {
    check_query_params(&params, LIST_PARAMS)?;

    let account_uid = match filter_param(&params, "account_uid") {
        Some(raw) => Some(AccountUid::parse(raw).ok_or_else(invalid_query_parameter)?),
        None => None,
    };
    let strategy_uid = match filter_param(&params, "strategy_uid") {
        Some(raw) => Some(StrategyUid::parse(raw).ok_or_else(invalid_query_parameter)?),
        None => None,
    };

    let filter = TradeFilter {
        account_uid,
        strategy_uid,
    };
    let trades = TradesRepository::list(&state.pool, user.id, &filter)
        .await?
        .into_iter()
        .map(TradeResponse::from)
        .collect();

    Ok(Json(TradeListResponse { trades }))
}

#[instrument(skip_all, name = "tm.handlers.get_trade")]
pub async fn get_trade(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<Json<TradeResponse>, TmError> {
    let uid = TradeUid::parse(&raw_uid).ok_or_else(trade_not_found)?;
    let trade = TradesRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(trade_not_found)?;

    Ok(Json(trade.into()))
}

/// Overwrite a trade. `account_uid` in the body is ignored.
#[instrument(skip_all, name = "tm.handlers.update_trade")]
pub async fn update_trade(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
    body: Bytes,
) -> Result<StatusCode, TmError> {
    let uid = TradeUid::parse(&raw_uid).ok_or_else(trade_not_found)?;
    let trade = TradesRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(trade_not_found)?;

    let body = parse_object(&body)?;
    let payload = TradePayload::from_body(&body)?;
    let strategy_id = resolve_strategy(&state.pool, user.id, &body).await?;

    TradesRepository::update(&state.pool, trade.id, strategy_id, &payload).await?;

    tracing::info!(target: "tm.handlers.trades", trade_uid = %uid, "Trade updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, name = "tm.handlers.delete_trade")]
pub async fn delete_trade(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<StatusCode, TmError> {
    let uid = TradeUid::parse(&raw_uid).ok_or_else(trade_not_found)?;
    if !TradesRepository::delete(&state.pool, user.id, uid).await? {
        return Err(trade_not_found());
    }

    tracing::info!(target: "tm.handlers.trades", trade_uid = %uid, "Trade deleted");
    Ok(StatusCode::NO_CONTENT)
}
