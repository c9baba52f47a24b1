#[derive(Debug, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub status: String,
}
