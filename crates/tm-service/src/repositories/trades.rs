//! Trades repository.
//!
//! Trades reference their account and strategy by internal id; reads join
//! both so responses expose only public uids.

use crate::errors::TmError;
use crate::models::TradeRow;
use crate::repositories::timed;
use crate::schema::TradePayload;
use common::types::{AccountUid, StrategyUid, TradeUid};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

const SELECT_TRADE: &str = r#"
    SELECT t.id, t.uid, a.uid AS account_uid, s.uid AS strategy_uid,
           t.symbol, t.side, t.quantity, t.entry_price, t.exit_price,
           t.opened_at, t.closed_at
    FROM trades t
    JOIN accounts a ON a.id = t.account_id
    LEFT JOIN strategies s ON s.id = t.strategy_id
"#;

/// Optional filters of `GET /v1/trades`, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub account_uid: Option<AccountUid>,
    pub strategy_uid: Option<StrategyUid>,
}

pub struct TradesRepository;

impl TradesRepository {
    /// Insert a trade. A trade created with an exit price is closed at once.
    #[instrument(skip_all, name = "tm.repo.create_trade")]
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        account_id: i64,
        strategy_id: Option<i64>,
        payload: &TradePayload,
    ) -> Result<Uuid, TmError> {
        let row = timed(
            "create_trade",
            sqlx::query(
                r#"
                INSERT INTO trades (
                    account_id, strategy_id, user_id, symbol, side,
                    quantity, entry_price, exit_price, closed_at
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8,
                    CASE WHEN $8::double precision IS NULL THEN NULL ELSE NOW() END
                )
                RETURNING uid
                "#,
            )
            .bind(account_id) // $1
            .bind(strategy_id) // $2
            .bind(user_id) // $3
            .bind(&payload.symbol) // $4
            .bind(payload.side.as_str()) // $5
            .bind(payload.quantity) // $6
            .bind(payload.entry_price) // $7
            .bind(payload.exit_price) // $8
            .fetch_one(pool),
        )
        .await?;

        Ok(row.get("uid"))
    }

    /// Trades of a user, oldest first.
    #[instrument(skip_all, name = "tm.repo.list_trades")]
    pub async fn list(
        pool: &PgPool,
        user_id: i64,
        filter: &TradeFilter,
    ) -> Result<Vec<TradeRow>, TmError> {
        let query = format!(
            "{SELECT_TRADE}
            WHERE t.user_id = $1
              AND ($2::uuid IS NULL OR a.uid = $2)
              AND ($3::uuid IS NULL OR s.uid = $3)
            ORDER BY t.id"
        );

        let rows = timed(
            "list_trades",
            sqlx::query(&query)
                .bind(user_id)
                .bind(filter.account_uid.map(|uid| uid.0))
                .bind(filter.strategy_uid.map(|uid| uid.0))
                .fetch_all(pool),
        )
        .await?;

        Ok(rows.into_iter().map(map_trade_row).collect())
    }

    #[instrument(skip_all, name = "tm.repo.find_trade")]
    pub async fn find(
        pool: &PgPool,
        user_id: i64,
        uid: TradeUid,
    ) -> Result<Option<TradeRow>, TmError> {
        let query = format!("{SELECT_TRADE} WHERE t.uid = $1 AND t.user_id = $2");

        let row = timed(
            "find_trade",
            sqlx::query(&query)
                .bind(uid.0)
                .bind(user_id)
                .fetch_optional(pool),
        )
        .await?;

        Ok(row.map(map_trade_row))
    }

    /// Overwrite a trade. Clearing the exit price reopens the trade; setting
    /// it stamps `closed_at` unless already closed.
    #[instrument(skip_all, name = "tm.repo.update_trade")]
    pub async fn update(
        pool: &PgPool,
        trade_id: i64,
        strategy_id: Option<i64>,
        payload: &TradePayload,
    ) -> Result<(), TmError> {
        timed(
            "update_trade",
            sqlx::query(
                r#"
                UPDATE trades
                SET strategy_id = $1, symbol = $2, side = $3, quantity = $4,
                    entry_price = $5, exit_price = $6,
                    closed_at = CASE
                        WHEN $6::double precision IS NULL THEN NULL
                        ELSE COALESCE(closed_at, NOW())
                    END,
                    updated_at = NOW()
                WHERE id = $7
                "#,
            )
            .bind(strategy_id)
            .bind(&payload.symbol)
            .bind(payload.side.as_str())
            .bind(payload.quantity)
            .bind(payload.entry_price)
            .bind(payload.exit_price)
            .bind(trade_id)
            .execute(pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip_all, name = "tm.repo.delete_trade")]
    pub async fn delete(pool: &PgPool, user_id: i64, uid: TradeUid) -> Result<bool, TmError> {
        let result = timed(
            "delete_trade",
            sqlx::query("DELETE FROM trades WHERE uid = $1 AND user_id = $2")
                .bind(uid.0)
                .bind(user_id)
                .execute(pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_trade_row(row: PgRow) -> TradeRow {
    TradeRow {
        id: row.get("id"),
        uid: row.get("uid"),
        account_uid: row.get("account_uid"),
        strategy_uid: row.get("strategy_uid"),
        symbol: row.get("symbol"),
        side: row.get("side"),
        quantity: row.get("quantity"),
        entry_price: row.get("entry_price"),
        exit_price: row.get("exit_price"),
        opened_at: row.get("opened_at"),
        closed_at: row.get("closed_at"),
    }
}
