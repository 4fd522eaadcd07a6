//! Account handlers.
//!
//! An account always references one of the caller's brokers when it is
//! created or updated; the reference is checked before the body fields.

use crate::errors::TmError;
use crate::handlers::{check_query_params, filter_param, invalid_query_parameter};
use crate::middleware::AuthenticatedUser;
use crate::models::{AccountListItem, AccountListResponse, AccountResponse, CreatedResponse};
use crate::repositories::accounts::AccountFilter;
use crate::repositories::{AccountsRepository, BrokersRepository};
use crate::routes::AppState;
use crate::schema::{parse_object, AccountPayload};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::types::{AccountUid, BrokerUid};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

const LIST_PARAMS: &[&str] = &["broker_uid", "type_account"];

fn broker_uid_of(body: &Map<String, Value>) -> Option<BrokerUid> {
    body.get("broker_uid")
        .and_then(Value::as_str)
        .and_then(BrokerUid::parse)
}

/// Broker reference of an update body. Older clients send it as
/// `broker_id`; `broker_uid` wins when both are present.
fn update_broker_uid_of(body: &Map<String, Value>) -> Option<BrokerUid> {
    match body.get("broker_uid") {
        None | Some(Value::Null) => body
            .get("broker_id")
            .and_then(Value::as_str)
            .and_then(BrokerUid::parse),
        Some(_) => broker_uid_of(body),
    }
}

#[instrument(skip_all, name = "tm.handlers.create_account")]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), TmError> {
    let invalid_broker = || TmError::BadRequest("Invalid broker".to_string());

    let body = parse_object(&body)?;
    let broker_uid = broker_uid_of(&body).ok_or_else(invalid_broker)?;
    let broker = BrokersRepository::find(&state.pool, user.id, broker_uid)
        .await?
        .ok_or_else(invalid_broker)?;

    let payload = AccountPayload::from_body(&body)?;

    let uid = AccountsRepository::create(&state.pool, user.id, broker.id, &payload).await?;

    tracing::info!(target: "tm.handlers.accounts", account_uid = %uid, "Account created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { uid })))
}

/// List the caller's accounts, optionally filtered by broker and type.
#[instrument(skip_all, name = "tm.handlers.list_accounts")]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AccountListResponse>, TmError> {
    check_query_params(&params, LIST_PARAMS)?;

    let broker_uid = match filter_param(&params, "broker_uid") {
        Some(raw) => Some(BrokerUid::parse(raw).ok_or_else(invalid_query_parameter)?),
        None => None,
    };
    let filter = AccountFilter {
        broker_uid,
        type_account: filter_param(&params, "type_account").map(str::to_string),
    };

    let accounts = AccountsRepository::list(&state.pool, user.id, &filter)
        .await?
        .into_iter()
        .map(AccountListItem::from)
        .collect();

    Ok(Json(AccountListResponse { accounts }))
}

#[instrument(skip_all, name = "tm.handlers.get_account")]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<Json<AccountResponse>, TmError> {
    let not_found = || TmError::NotFound("Account not found".to_string());

    let uid = AccountUid::parse(&raw_uid).ok_or_else(not_found)?;
    let account = AccountsRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(account.into()))
}

/// Replace type, currency, initial balance and broker of an account.
#[instrument(skip_all, name = "tm.handlers.update_account")]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
    body: Bytes,
) -> Result<StatusCode, TmError> {
    let invalid = || TmError::BadRequest("Invalid broker or account".to_string());

    let body = parse_object(&body)?;

    let uid = AccountUid::parse(&raw_uid).ok_or_else(invalid)?;
    let account = AccountsRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(invalid)?;

    let broker_uid = update_broker_uid_of(&body).ok_or_else(invalid)?;
    let broker = BrokersRepository::find(&state.pool, user.id, broker_uid)
        .await?
        .ok_or_else(invalid)?;

    let payload = AccountPayload::from_body(&body)?;

    AccountsRepository::update(&state.pool, account.id, broker.id, &payload).await?;

    tracing::info!(target: "tm.handlers.accounts", account_uid = %uid, "Account updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, name = "tm.handlers.delete_account")]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<StatusCode, TmError> {
    let invalid = || TmError::BadRequest("Invalid account".to_string());

    let uid = AccountUid::parse(&raw_uid).ok_or_else(invalid)?;
    if !AccountsRepository::delete(&state.pool, user.id, uid).await? {
        return Err(invalid());
    }

    tracing::info!(target: "tm.handlers.accounts", account_uid = %uid, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
