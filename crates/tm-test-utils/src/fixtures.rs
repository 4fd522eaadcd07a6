//! Database seeders.
//!
//! Users are provisioned outside the service, so tests insert them directly.

use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Insert a confirmed user with the given public uid; returns its `id`.
pub async fn seed_user(pool: &PgPool, uid: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (uid, encrypted_password, name, email, risk, confirmed_at)
        VALUES ($1, 'x', $2, $3, 2, NOW())
        RETURNING id
        "#,
    )
    .bind(uid)
    .bind(format!("user-{}", &uid.simple().to_string()[..8]))
    .bind(format!("{}@example.com", uid.simple()))
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

/// Number of rows in `table`.
pub async fn count_rows(pool: &PgPool, table: &str) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(row.get("n"))
}
