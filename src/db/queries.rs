use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::CustomerNotification;

/// One persisted access credential. Rows are append-only; the newest row is
/// the authoritative one.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenRow {
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

pub async fn latest_token(pool: &SqlitePool) -> Result<Option<TokenRow>, sqlx::Error> {
    sqlx::query_as::<_, TokenRow>(
        "SELECT access_token, created_at FROM tokens ORDER BY created_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

pub async fn insert_token(
    pool: &SqlitePool,
    access_token: &str,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tokens (access_token, created_at) VALUES (?, ?)")
        .bind(access_token)
        .bind(created_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Whether reminder emails should go to this customer. A missing row reads as
/// opted in; this never writes.
pub async fn notify_days(pool: &SqlitePool, customer_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"SELECT COALESCE(
            (SELECT email_notify_days FROM customer_notifications WHERE customer_id = ?),
            1
        )"#,
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await
}

/// Administrative upsert of a customer's opt-in flag.
pub async fn set_notify_days(
    pool: &SqlitePool,
    customer_id: &str,
    email_notify_days: bool,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"INSERT INTO customer_notifications (customer_id, email_notify_days, created_at, updated_at)
           VALUES (?, ?, ?, ?)
           ON CONFLICT(customer_id) DO UPDATE SET
               email_notify_days = excluded.email_notify_days,
               updated_at = excluded.updated_at"#,
    )
    .bind(customer_id)
    .bind(email_notify_days)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_notification(
    pool: &SqlitePool,
    customer_id: &str,
) -> Result<Option<CustomerNotification>, sqlx::Error> {
    sqlx::query_as::<_, CustomerNotification>(
        "SELECT id, customer_id, email_notify_days, created_at, updated_at
         FROM customer_notifications WHERE customer_id = ?",
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await
}
