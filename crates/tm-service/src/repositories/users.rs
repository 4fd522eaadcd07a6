//! Users repository.
//!
//! Users are provisioned outside this service; only lookup is needed.

use crate::errors::TmError;
use crate::models::UserRow;
use crate::repositories::timed;
use common::types::UserUid;
use sqlx::{PgPool, Row};
use tracing::instrument;

pub struct UsersRepository;

impl UsersRepository {
    /// Find a user by public uid.
    #[instrument(skip_all, name = "tm.repo.find_user")]
    pub async fn find_by_uid(pool: &PgPool, uid: UserUid) -> Result<Option<UserRow>, TmError> {
        let row = timed(
            "find_user",
            sqlx::query(
                r#"
                SELECT id, uid, name, email, risk, confirmed_at, created_at
                FROM users
                WHERE uid = $1
                "#,
            )
            .bind(uid.0)
            .fetch_optional(pool),
        )
        .await?;

        Ok(row.map(|row| UserRow {
            id: row.get("id"),
            uid: row.get("uid"),
            name: row.get("name"),
            email: row.get("email"),
            risk: row.get("risk"),
            confirmed_at: row.get("confirmed_at"),
            created_at: row.get("created_at"),
        }))
    }
}
