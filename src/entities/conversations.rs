use chrono::{DateTime, Utc};

#[derive(Debug, sqlx::FromRow)]
pub struct Conversation {
    pub id: u64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub listing_id: Option<i64>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
