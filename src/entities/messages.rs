use chrono::{DateTime, Utc};

#[derive(Debug, sqlx::FromRow)]
pub struct Message {
    pub id: u64,
    pub conversation_id: u64,
    pub sender_id: i64,
    pub content: String,
    pub is_read: bool,
    pub edited: bool,
    pub sent_at: DateTime<Utc>,
}
