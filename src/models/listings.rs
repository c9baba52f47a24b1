use crate::entities::listings::Listing as ListingEntity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub listing_id: i64,
    pub seller_id: i64,
    pub title: String,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub status: String,
}

impl From<ListingEntity> for ListingSummary {
    fn from(value: ListingEntity) -> Self {
        Self {
            listing_id: value.id,
            seller_id: value.seller_id,
            title: value.title,
            price_cents: value.price_cents,
            image_url: value.image_url,
            status: value.status,
        }
    }
}
