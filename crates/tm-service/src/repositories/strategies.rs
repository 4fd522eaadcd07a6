//! Strategies repository.

use crate::errors::TmError;
use crate::models::StrategyRow;
use crate::repositories::timed;
use common::types::StrategyUid;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

pub struct StrategiesRepository;

impl StrategiesRepository {
    #[instrument(skip_all, name = "tm.repo.create_strategy")]
    pub async fn create(pool: &PgPool, user_id: i64, name: &str) -> Result<Uuid, TmError> {
        let row = timed(
            "create_strategy",
            sqlx::query("INSERT INTO strategies (name, user_id) VALUES ($1, $2) RETURNING uid")
                .bind(name)
                .bind(user_id)
                .fetch_one(pool),
        )
        .await?;

        Ok(row.get("uid"))
    }

    #[instrument(skip_all, name = "tm.repo.list_strategies")]
    pub async fn list(pool: &PgPool, user_id: i64) -> Result<Vec<StrategyRow>, TmError> {
        let rows = timed(
            "list_strategies",
            sqlx::query("SELECT id, uid, name FROM strategies WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(pool),
        )
        .await?;

        Ok(rows.into_iter().map(map_strategy_row).collect())
    }

    #[instrument(skip_all, name = "tm.repo.find_strategy")]
    pub async fn find(
        pool: &PgPool,
        user_id: i64,
        uid: StrategyUid,
    ) -> Result<Option<StrategyRow>, TmError> {
        let row = timed(
            "find_strategy",
            sqlx::query("SELECT id, uid, name FROM strategies WHERE uid = $1 AND user_id = $2")
                .bind(uid.0)
                .bind(user_id)
                .fetch_optional(pool),
        )
        .await?;

        Ok(row.map(map_strategy_row))
    }

    #[instrument(skip_all, name = "tm.repo.update_strategy")]
    pub async fn update(pool: &PgPool, strategy_id: i64, name: &str) -> Result<(), TmError> {
        timed(
            "update_strategy",
            sqlx::query("UPDATE strategies SET name = $1, updated_at = NOW() WHERE id = $2")
                .bind(name)
                .bind(strategy_id)
                .execute(pool),
        )
        .await?;

        Ok(())
    }

    /// Delete a strategy; trades that used it keep existing without one.
    #[instrument(skip_all, name = "tm.repo.delete_strategy")]
    pub async fn delete(pool: &PgPool, user_id: i64, uid: StrategyUid) -> Result<bool, TmError> {
        let result = timed(
            "delete_strategy",
            sqlx::query("DELETE FROM strategies WHERE uid = $1 AND user_id = $2")
                .bind(uid.0)
                .bind(user_id)
                .execute(pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_strategy_row(row: PgRow) -> StrategyRow {
    StrategyRow {
        id: row.get("id"),
        uid: row.get("uid"),
        name: row.get("name"),
    }
}
