//! Accounts repository.
//!
//! Account reads join the owning broker so responses can carry the broker's
//! uid and name without a second round trip.

use crate::errors::TmError;
use crate::models::AccountRow;
use crate::repositories::timed;
use crate::schema::AccountPayload;
use common::types::{AccountUid, BrokerUid};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

const SELECT_ACCOUNT: &str = r#"
    SELECT a.id, a.uid, a.type_account, a.currency, a.initial_balance,
           a.current_balance, a.broker_id, b.uid AS broker_uid, b.name AS broker_name
    FROM accounts a
    LEFT JOIN brokers b ON b.id = a.broker_id
"#;

/// Optional filters of `GET /v1/accounts`, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub broker_uid: Option<BrokerUid>,
    pub type_account: Option<String>,
}

pub struct AccountsRepository;

impl AccountsRepository {
    /// Insert an account whose current balance starts at the initial one.
    #[instrument(skip_all, name = "tm.repo.create_account")]
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        broker_id: i64,
        payload: &AccountPayload,
    ) -> Result<Uuid, TmError> {
        let row = timed(
            "create_account",
            sqlx::query(
                r#"
                INSERT INTO accounts (
                    type_account, currency, initial_balance, current_balance,
                    broker_id, user_id
                )
                VALUES ($1, $2, $3, $3, $4, $5)
                RETURNING uid
                "#,
            )
            .bind(&payload.type_account) // $1
            .bind(&payload.currency) // $2
            .bind(payload.initial_balance) // $3
            .bind(broker_id) // $4
            .bind(user_id) // $5
            .fetch_one(pool),
        )
        .await?;

        Ok(row.get("uid"))
    }

    /// Accounts of a user in creation order.
    #[instrument(skip_all, name = "tm.repo.list_accounts")]
    pub async fn list(
        pool: &PgPool,
        user_id: i64,
        filter: &AccountFilter,
    ) -> Result<Vec<AccountRow>, TmError> {
        let query = format!(
            "{SELECT_ACCOUNT}
            WHERE a.user_id = $1
              AND ($2::uuid IS NULL OR b.uid = $2)
              AND ($3::text IS NULL OR a.type_account = $3)
            ORDER BY a.id"
        );

        let rows = timed(
            "list_accounts",
            sqlx::query(&query)
                .bind(user_id)
                .bind(filter.broker_uid.map(|uid| uid.0))
                .bind(filter.type_account.as_deref())
                .fetch_all(pool),
        )
        .await?;

        Ok(rows.into_iter().map(map_account_row).collect())
    }

    #[instrument(skip_all, name = "tm.repo.find_account")]
    pub async fn find(
        pool: &PgPool,
        user_id: i64,
        uid: AccountUid,
    ) -> Result<Option<AccountRow>, TmError> {
        let query = format!("{SELECT_ACCOUNT} WHERE a.uid = $1 AND a.user_id = $2");

        let row = timed(
            "find_account",
            sqlx::query(&query)
                .bind(uid.0)
                .bind(user_id)
                .fetch_optional(pool),
        )
        .await?;

        Ok(row.map(map_account_row))
    }

    /// Overwrite the editable fields of an account. `current_balance` is
    /// left as is.
    #[instrument(skip_all, name = "tm.repo.update_account")]
    pub async fn update(
        pool: &PgPool,
        account_id: i64,
        broker_id: i64,
        payload: &AccountPayload,
    ) -> Result<(), TmError> {
        timed(
            "update_account",
            sqlx::query(
                r#"
                UPDATE accounts
                SET type_account = $1, currency = $2, initial_balance = $3,
                    broker_id = $4, updated_at = NOW()
                WHERE id = $5
                "#,
            )
            .bind(&payload.type_account)
            .bind(&payload.currency)
            .bind(payload.initial_balance)
            .bind(broker_id)
            .bind(account_id)
            .execute(pool),
        )
        .await?;

        Ok(())
    }

    /// Delete an account and, by cascade, its trades.
    #[instrument(skip_all, name = "tm.repo.delete_account")]
    pub async fn delete(pool: &PgPool, user_id: i64, uid: AccountUid) -> Result<bool, TmError> {
        let result = timed(
            "delete_account",
            sqlx::query("DELETE FROM accounts WHERE uid = $1 AND user_id = $2")
                .bind(uid.0)
                .bind(user_id)
                .execute(pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn map_account_row(row: PgRow) -> AccountRow {
    AccountRow {
        id: row.get("id"),
        uid: row.get("uid"),
        type_account: row.get("type_account"),
        currency: row.get("currency"),
        initial_balance: row.get("initial_balance"),
        current_balance: row.get("current_balance"),
        broker_id: row.get("broker_id"),
        broker_uid: row.get("broker_uid"),
        broker_name: row.get("broker_name"),
    }
}
