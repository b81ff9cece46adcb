use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A selection row joined with its owner's username
#[derive(Debug, Clone, FromRow)]
pub struct Selection {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub owner_username: String,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
