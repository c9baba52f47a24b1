use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::events::ChangeEvent;
use crate::models::messages::Message;
use crate::repositories::conversations as conversations_repo;
use crate::repositories::messages;
use crate::repositories::streams::Topic;
use crate::usecases::{conversations, streams};
use hashbrown::HashMap;
use uuid::Uuid;

const MAX_MESSAGE_LENGTH: usize = 2000;

/// Appends a message and touches the parent conversation's
/// last_message_at. The two writes are sequential, not transactional; a
/// crash in between leaves last_message_at stale but the message intact.
pub async fn send<C: Context>(
    ctx: &C,
    conversation_id: u64,
    sender_id: i64,
    content: &str,
    origin_subscriber_id: Option<Uuid>,
) -> ServiceResult<Message> {
    let conversation = conversations::fetch_one(ctx, conversation_id).await?;
    if !conversation.is_participant(sender_id) {
        return Err(AppError::ConversationsNotParticipant);
    }
    if content.is_empty() || content.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::MessagesInvalidLength);
    }

    let message = match messages::create(ctx, conversation_id, sender_id, content).await {
        Ok(message) => Message::from(message),
        Err(e) => return unexpected(e),
    };
    match conversations_repo::touch(ctx, conversation_id).await {
        Ok(()) => {}
        Err(e) => return unexpected(e),
    }
    let conversation = conversations::fetch_one(ctx, conversation_id).await?;

    let excluded = origin_subscriber_id.map(|id| vec![id]);
    streams::publish(
        ctx,
        Topic::Conversation(conversation_id),
        &ChangeEvent::MessageInserted {
            message: message.clone(),
        },
        excluded.clone(),
    )
    .await?;
    for user_id in [conversation.buyer_id, conversation.seller_id] {
        streams::publish(
            ctx,
            Topic::UserConversations(user_id),
            &ChangeEvent::ConversationUpdated {
                conversation: conversation.clone(),
            },
            excluded.clone(),
        )
        .await?;
    }
    Ok(message)
}

pub async fn fetch_for_conversation<C: Context>(
    ctx: &C,
    conversation_id: u64,
) -> ServiceResult<Vec<Message>> {
    conversations::fetch_one(ctx, conversation_id).await?;
    match messages::fetch_for_conversation(ctx, conversation_id).await {
        Ok(messages) => Ok(messages.into_iter().map(Message::from).collect()),
        Err(e) => unexpected(e),
    }
}

pub async fn edit<C: Context>(
    ctx: &C,
    message_id: u64,
    editor_id: i64,
    content: &str,
    origin_subscriber_id: Option<Uuid>,
) -> ServiceResult<Message> {
    let message = fetch_one(ctx, message_id).await?;
    if message.sender_id != editor_id {
        return Err(AppError::MessagesNotSender);
    }
    if content.is_empty() || content.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::MessagesInvalidLength);
    }

    match messages::update_content(ctx, message_id, content).await {
        Ok(()) => {}
        Err(e) => return unexpected(e),
    }
    let message = fetch_one(ctx, message_id).await?;

    streams::publish(
        ctx,
        Topic::Conversation(message.conversation_id),
        &ChangeEvent::MessageUpdated {
            message: message.clone(),
        },
        origin_subscriber_id.map(|id| vec![id]),
    )
    .await?;
    Ok(message)
}

pub async fn delete<C: Context>(
    ctx: &C,
    message_id: u64,
    deleter_id: i64,
    origin_subscriber_id: Option<Uuid>,
) -> ServiceResult<()> {
    let message = fetch_one(ctx, message_id).await?;
    if message.sender_id != deleter_id {
        return Err(AppError::MessagesNotSender);
    }

    match messages::delete(ctx, message_id).await {
        Ok(()) => {}
        Err(e) => return unexpected(e),
    }

    streams::publish(
        ctx,
        Topic::Conversation(message.conversation_id),
        &ChangeEvent::MessageDeleted {
            message_id,
            conversation_id: message.conversation_id,
        },
        origin_subscriber_id.map(|id| vec![id]),
    )
    .await?;
    Ok(())
}

/// Bulk-flips everything the other participant sent to read. One
/// MessagesRead event stands in for the per-row updates; subscribers
/// recompute unread counts wholesale.
pub async fn mark_read<C: Context>(
    ctx: &C,
    conversation_id: u64,
    reader_id: i64,
    origin_subscriber_id: Option<Uuid>,
) -> ServiceResult<u64> {
    let conversation = conversations::fetch_one(ctx, conversation_id).await?;
    if !conversation.is_participant(reader_id) {
        return Err(AppError::ConversationsNotParticipant);
    }

    let flipped = match messages::mark_read(ctx, conversation_id, reader_id).await {
        Ok(flipped) => flipped,
        Err(e) => return unexpected(e),
    };
    if flipped > 0 {
        streams::publish(
            ctx,
            Topic::Conversation(conversation_id),
            &ChangeEvent::MessagesRead {
                conversation_id,
                reader_id,
            },
            origin_subscriber_id.map(|id| vec![id]),
        )
        .await?;
    }
    Ok(flipped)
}

/// Per-conversation count of messages not sent by the user and not yet
/// read. Conversations with no unread messages report zero.
pub async fn unread_counts<C: Context>(
    ctx: &C,
    conversation_ids: &[u64],
    user_id: i64,
) -> ServiceResult<HashMap<u64, i64>> {
    let counted = match messages::unread_counts(ctx, conversation_ids, user_id).await {
        Ok(counted) => counted,
        Err(e) => return unexpected(e),
    };
    let mut counts: HashMap<u64, i64> = conversation_ids.iter().map(|id| (*id, 0)).collect();
    for (conversation_id, count) in counted {
        counts.insert(conversation_id, count);
    }
    Ok(counts)
}

async fn fetch_one<C: Context>(ctx: &C, message_id: u64) -> ServiceResult<Message> {
    match messages::fetch_one(ctx, message_id).await {
        Ok(message) => Ok(Message::from(message)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::MessagesNotFound),
        Err(e) => unexpected(e),
    }
}
