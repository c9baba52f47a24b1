use crate::common::context::Context;
use crate::entities::conversations::Conversation;

const TABLE_NAME: &str = "conversations";
const READ_FIELDS: &str = "id, buyer_id, seller_id, listing_id, last_message_at, created_at";

pub async fn fetch_one<C: Context>(ctx: &C, conversation_id: u64) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_one(ctx.db())
        .await
}

/// Lookup by the (buyer, seller, listing) identity triple. `<=>` is the
/// NULL-safe equality operator, so a missing listing id matches rows where
/// listing_id IS NULL.
pub async fn fetch_by_triple<C: Context>(
    ctx: &C,
    buyer_id: i64,
    seller_id: i64,
    listing_id: Option<i64>,
) -> sqlx::Result<Option<Conversation>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE buyer_id = ? AND seller_id = ? AND listing_id <=> ?"
    );
    sqlx::query_as(QUERY)
        .bind(buyer_id)
        .bind(seller_id)
        .bind(listing_id)
        .fetch_optional(ctx.db())
        .await
}

pub async fn create<C: Context>(
    ctx: &C,
    buyer_id: i64,
    seller_id: i64,
    listing_id: Option<i64>,
) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (buyer_id, seller_id, listing_id, last_message_at) VALUES (?, ?, ?, NOW())"
    );
    let result = sqlx::query(QUERY)
        .bind(buyer_id)
        .bind(seller_id)
        .bind(listing_id)
        .execute(ctx.db())
        .await?;
    fetch_one(ctx, result.last_insert_id()).await
}

pub async fn fetch_for_user<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<Conversation>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE buyer_id = ? OR seller_id = ? ORDER BY last_message_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn touch<C: Context>(ctx: &C, conversation_id: u64) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET last_message_at = NOW() WHERE id = ?"
    );
    sqlx::query(QUERY)
        .bind(conversation_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}
