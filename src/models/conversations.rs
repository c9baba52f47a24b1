use crate::entities::conversations::Conversation as ConversationEntity;
use crate::models::listings::ListingSummary;
use crate::models::users::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: u64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub listing_id: Option<i64>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}

impl From<ConversationEntity> for Conversation {
    fn from(value: ConversationEntity) -> Self {
        Self {
            conversation_id: value.id,
            buyer_id: value.buyer_id,
            seller_id: value.seller_id,
            listing_id: value.listing_id,
            last_message_at: value.last_message_at,
            created_at: value.created_at,
        }
    }
}

/// Display projection for the conversation list: participant profiles and
/// listing metadata are joined at query time, not stored with the row.
#[derive(Debug, Serialize)]
pub struct ConversationView {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub buyer: UserProfile,
    pub seller: UserProfile,
    pub listing: Option<ListingSummary>,
}

#[derive(Deserialize)]
pub struct CreateConversationArgs {
    pub buyer_id: i64,
    pub seller_id: i64,
    pub listing_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct ConversationListArgs {
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn conversation() -> Conversation {
        Conversation {
            conversation_id: 1,
            buyer_id: 10,
            seller_id: 20,
            listing_id: Some(5),
            last_message_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn participant_checks() {
        let conv = conversation();
        assert!(conv.is_participant(10));
        assert!(conv.is_participant(20));
        assert!(!conv.is_participant(30));
    }
}
