use crate::common::context::Context;
use crate::entities::messages::Message;

const TABLE_NAME: &str = "messages";
const READ_FIELDS: &str = "id, conversation_id, sender_id, content, is_read, edited, sent_at";

pub async fn fetch_one<C: Context>(ctx: &C, message_id: u64) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(message_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn create<C: Context>(
    ctx: &C,
    conversation_id: u64,
    sender_id: i64,
    content: &str,
) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (conversation_id, sender_id, content, is_read) VALUES (?, ?, ?, FALSE)"
    );
    let result = sqlx::query(QUERY)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_id()).await
}

pub async fn fetch_for_conversation<C: Context>(
    ctx: &C,
    conversation_id: u64,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE conversation_id = ? ORDER BY sent_at ASC, id ASC"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn update_content<C: Context>(
    ctx: &C,
    message_id: u64,
    content: &str,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET content = ?, edited = TRUE WHERE id = ?"
    );
    sqlx::query(QUERY)
        .bind(content)
        .bind(message_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn delete<C: Context>(ctx: &C, message_id: u64) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE id = ?");
    sqlx::query(QUERY)
        .bind(message_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Flips is_read for every message in the conversation not sent by the
/// reader. Returns the number of flipped rows.
pub async fn mark_read<C: Context>(
    ctx: &C,
    conversation_id: u64,
    reader_id: i64,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET is_read = TRUE WHERE conversation_id = ? AND sender_id != ? AND is_read = FALSE"
    );
    let result = sqlx::query(QUERY)
        .bind(conversation_id)
        .bind(reader_id)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected())
}

pub async fn unread_counts<C: Context>(
    ctx: &C,
    conversation_ids: &[u64],
    user_id: i64,
) -> sqlx::Result<Vec<(u64, i64)>> {
    if conversation_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; conversation_ids.len()].join(",");
    let query = format!(
        "SELECT conversation_id, COUNT(*) FROM {TABLE_NAME} \
         WHERE conversation_id IN ({placeholders}) \
         AND sender_id != ? AND is_read = FALSE \
         GROUP BY conversation_id"
    );
    let mut query = sqlx::query_as(&query);
    for conversation_id in conversation_ids {
        query = query.bind(conversation_id);
    }
    query.bind(user_id).fetch_all(ctx.db()).await
}
