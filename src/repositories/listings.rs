use crate::common::context::Context;
use crate::entities::listings::Listing;

const TABLE_NAME: &str = "listings";
const READ_FIELDS: &str = "id, seller_id, title, price_cents, image_url, status";

pub async fn fetch_one<C: Context>(ctx: &C, listing_id: i64) -> sqlx::Result<Listing> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(listing_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_many<C: Context>(ctx: &C, listing_ids: &[i64]) -> sqlx::Result<Vec<Listing>> {
    if listing_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; listing_ids.len()].join(",");
    let query =
        format!("SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as(&query);
    for listing_id in listing_ids {
        query = query.bind(listing_id);
    }
    query.fetch_all(ctx.db()).await
}
