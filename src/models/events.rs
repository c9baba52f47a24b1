use crate::models::conversations::Conversation;
use crate::models::messages::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed change notification delivered to subscribers. Clients reconcile
/// local state from these: append on insert, replace on update, remove on
/// delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    MessageInserted {
        message: Message,
    },
    MessageUpdated {
        message: Message,
    },
    MessageDeleted {
        message_id: u64,
        conversation_id: u64,
    },
    MessagesRead {
        conversation_id: u64,
        reader_id: i64,
    },
    ConversationUpdated {
        conversation: Conversation,
    },
}

#[derive(Deserialize)]
pub struct SubscribeArgs {
    pub subscriber_id: Uuid,
    pub topic: String,
}

#[derive(Deserialize)]
pub struct UnsubscribeArgs {
    pub subscriber_id: Uuid,
    /// When absent, all of the subscriber's topics are dropped.
    pub topic: Option<String>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<ChangeEvent>,
}

#[derive(Serialize)]
pub struct SubscriptionAck {
    pub subscriber_id: Uuid,
    pub topic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_kind() {
        let event = ChangeEvent::MessageDeleted {
            message_id: 7,
            conversation_id: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "message_deleted");
        assert_eq!(json["message_id"], 7);
        assert_eq!(json["conversation_id"], 3);
    }

    #[test]
    fn read_marker_event_carries_the_reader() {
        let event = ChangeEvent::MessagesRead {
            conversation_id: 3,
            reader_id: 42,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        match back {
            ChangeEvent::MessagesRead {
                conversation_id,
                reader_id,
            } => {
                assert_eq!(conversation_id, 3);
                assert_eq!(reader_id, 42);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
