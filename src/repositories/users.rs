use crate::common::context::Context;
use crate::entities::users::User;

const TABLE_NAME: &str = "users";
const READ_FIELDS: &str = "id, username, display_name, avatar_url, business_name";

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<User> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_many<C: Context>(ctx: &C, user_ids: &[i64]) -> sqlx::Result<Vec<User>> {
    if user_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; user_ids.len()].join(",");
    let query =
        format!("SELECT {READ_FIELDS} FROM {TABLE_NAME} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as(&query);
    for user_id in user_ids {
        query = query.bind(user_id);
    }
    query.fetch_all(ctx.db()).await
}
