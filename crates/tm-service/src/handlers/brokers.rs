//! Broker handlers.
//!
//! - `POST /v1/brokers`
//! - `GET /v1/brokers`, `GET /v1/brokers/:uid`
//! - `PUT /v1/brokers/:uid`, `DELETE /v1/brokers/:uid`

use crate::errors::TmError;
use crate::middleware::AuthenticatedUser;
use crate::models::{BrokerAccount, BrokerListResponse, BrokerResponse, CreatedResponse};
use crate::repositories::BrokersRepository;
use crate::routes::AppState;
use crate::schema::{parse_object, BrokerPayload};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common::types::BrokerUid;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

fn broker_not_found() -> TmError {
    TmError::NotFound("Broker not found".to_string())
}

#[instrument(skip_all, name = "tm.handlers.create_broker")]
pub async fn create_broker(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), TmError> {
    let payload = BrokerPayload::from_body(&parse_object(&body)?)?;

    let uid = BrokersRepository::create(&state.pool, user.id, &payload.name).await?;

    tracing::info!(target: "tm.handlers.brokers", broker_uid = %uid, "Broker created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { uid })))
}

/// List the caller's brokers, each with its accounts.
#[instrument(skip_all, name = "tm.handlers.list_brokers")]
pub async fn list_brokers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<BrokerListResponse>, TmError> {
    let brokers = BrokersRepository::list(&state.pool, user.id).await?;
    let ids: Vec<i64> = brokers.iter().map(|b| b.id).collect();

    let mut accounts: HashMap<i64, Vec<BrokerAccount>> = HashMap::new();
    for account in BrokersRepository::accounts_of(&state.pool, &ids).await? {
        if let Some(broker_id) = account.broker_id {
            accounts.entry(broker_id).or_default().push(account.into());
        }
    }

    let brokers = brokers
        .into_iter()
        .map(|b| BrokerResponse {
            accounts: accounts.remove(&b.id).unwrap_or_default(),
            uid: b.uid,
            name: b.name,
        })
        .collect();

    Ok(Json(BrokerListResponse { brokers }))
}

#[instrument(skip_all, name = "tm.handlers.get_broker")]
pub async fn get_broker(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<Json<BrokerResponse>, TmError> {
    let uid = BrokerUid::parse(&raw_uid).ok_or_else(broker_not_found)?;
    let broker = BrokersRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(broker_not_found)?;

    let accounts = BrokersRepository::accounts_of(&state.pool, &[broker.id])
        .await?
        .into_iter()
        .map(BrokerAccount::from)
        .collect();

    Ok(Json(BrokerResponse {
        uid: broker.uid,
        name: broker.name,
        accounts,
    }))
}

/// Rename a broker. Existence is checked before the body.
#[instrument(skip_all, name = "tm.handlers.update_broker")]
pub async fn update_broker(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
    body: Bytes,
) -> Result<StatusCode, TmError> {
    let uid = BrokerUid::parse(&raw_uid).ok_or_else(broker_not_found)?;
    BrokersRepository::find(&state.pool, user.id, uid)
        .await?
        .ok_or_else(broker_not_found)?;

    let payload = BrokerPayload::from_body(&parse_object(&body)?)?;

    if !BrokersRepository::update(&state.pool, user.id, uid, &payload.name).await? {
        return Err(broker_not_found());
    }

    tracing::info!(target: "tm.handlers.brokers", broker_uid = %uid, "Broker updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, name = "tm.handlers.delete_broker")]
pub async fn delete_broker(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_uid): Path<String>,
) -> Result<StatusCode, TmError> {
    let invalid = || TmError::BadRequest("Invalid broker".to_string());

    let uid = BrokerUid::parse(&raw_uid).ok_or_else(invalid)?;
    if !BrokersRepository::delete(&state.pool, user.id, uid).await? {
        return Err(invalid());
    }

    tracing::info!(target: "tm.handlers.brokers", broker_uid = %uid, "Broker deleted");
    Ok(StatusCode::NO_CONTENT)
}
