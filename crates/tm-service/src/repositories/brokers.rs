//! Brokers repository.

use crate::errors::TmError;
use crate::models::{AccountRow, BrokerRow};
use crate::repositories::accounts::map_account_row;
use crate::repositories::timed;
use common::types::BrokerUid;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

pub struct BrokersRepository;

impl BrokersRepository {
    #[instrument(skip_all, name = "tm.repo.create_broker")]
    pub async fn create(pool: &PgPool, user_id: i64, name: &str) -> Result<Uuid, TmError> {
        let row = timed(
            "create_broker",
            sqlx::query("INSERT INTO brokers (name, user_id) VALUES ($1, $2) RETURNING uid")
                .bind(name)
                .bind(user_id)
                .fetch_one(pool),
        )
        .await?;

        Ok(row.get("uid"))
    }

    /// Brokers of a user in creation order.
    #[instrument(skip_all, name = "tm.repo.list_brokers")]
    pub async fn list(pool: &PgPool, user_id: i64) -> Result<Vec<BrokerRow>, TmError> {
        let rows = timed(
            "list_brokers",
            sqlx::query("SELECT id, uid, name FROM brokers WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(pool),
        )
        .await?;

        Ok(rows.into_iter().map(map_broker_row).collect())
    }

    #[instrument(skip_all, name = "tm.repo.find_broker")]
    pub async fn find(
        pool: &PgPool,
        user_id: i64,
        uid: BrokerUid,
    ) -> Result<Option<BrokerRow>, TmError> {
        let row = timed(
            "find_broker",
            sqlx::query("SELECT id, uid, name FROM brokers WHERE uid = $1 AND user_id = $2")
                .bind(uid.0)
                .bind(user_id)
                .fetch_optional(pool),
        )
        .await?;

        Ok(row.map(map_broker_row))
    }

    /// Accounts attached to any of `broker_ids`, in creation order.
    #[instrument(skip_all, name = "tm.repo.broker_accounts")]
    pub async fn accounts_of(pool: &PgPool, broker_ids: &[i64]) -> Result<Vec<AccountRow>, TmError> {
        if broker_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = timed(
            "broker_accounts",
            sqlx::query(
                r#"
                SELECT a.id, a.uid, a.type_account, a.currency, a.initial_balance,
                       a.current_balance, a.broker_id, b.uid AS broker_uid, b.name AS broker_name
                FROM accounts a
                JOIN brokers b ON b.id = a.broker_id
                WHERE a.broker_id = ANY($1)
                ORDER BY a.id
                "#,
            )
            .bind(broker_ids)
            .fetch_all(pool),
        )
        .await?;

        Ok(rows.into_iter().map(map_account_row).collect())
    }

    /// Rename a broker. Returns false when the user has no such broker.
    #[instrument(skip_all, name = "tm.repo.update_broker")]
    pub async fn update(
        pool: &PgPool,
        user_id: i64,
        uid: BrokerUid,
        name: &str,
    ) -> Result<bool, TmError> {
        let result = timed(
            "update_broker",
            sqlx::query(
                r#"
                UPDATE brokers SET name = $1, updated_at = NOW()
                WHERE uid = $2 AND user_id = $3
                "#,
            )
            .bind(name)
            .bind(uid.0)
            .bind(user_id)
            .execute(pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a broker; its accounts keep existing without one.
    #[instrument(skip_all, name = "tm.repo.delete_broker")]
    pub async fn delete(pool: &PgPool, user_id: i64, uid: BrokerUid) -> Result<bool, TmError> {
        let result = timed(
            "delete_broker",
            sqlx::query("DELETE FROM brokers WHERE uid = $1 AND user_id = $2")
                .bind(uid.0)
                .bind(user_id)
                .execute(pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_broker_row(row: PgRow) -> BrokerRow {
    BrokerRow {
        id: row.get("id"),
        uid: row.get("uid"),
        name: row.get("name"),
    }
}
