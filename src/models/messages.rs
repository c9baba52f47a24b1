use crate::entities::messages::Message as MessageEntity;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: u64,
    pub conversation_id: u64,
    pub sender_id: i64,
    pub content: String,
    pub read: bool,
    pub edited: bool,
    pub sent_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        Self {
            message_id: value.id,
            conversation_id: value.conversation_id,
            sender_id: value.sender_id,
            content: value.content,
            read: value.is_read,
            edited: value.edited,
            sent_at: value.sent_at,
        }
    }
}

#[derive(Deserialize)]
pub struct SendMessageArgs {
    pub sender_id: i64,
    pub content: String,
    /// Subscriber id of the sending client, excluded from its own fan-out.
    pub subscriber_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct EditMessageArgs {
    pub editor_id: i64,
    pub content: String,
    pub subscriber_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct DeleteMessageArgs {
    pub sender_id: i64,
    pub subscriber_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct MarkReadArgs {
    pub reader_id: i64,
    pub subscriber_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UnreadCountsArgs {
    pub user_id: i64,
    /// Comma-separated conversation ids.
    pub conversation_ids: String,
}

#[derive(Serialize)]
pub struct UnreadCountsResponse {
    pub counts: HashMap<u64, i64>,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub marked_read: u64,
}
