use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-customer opt-in flag for scheduled reminder emails.
///
/// At most one row per customer; a missing row means opted in.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerNotification {
    pub id: i64,
    pub customer_id: String,
    pub email_notify_days: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
