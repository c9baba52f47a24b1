use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::listings::ListingSummary;
use crate::repositories::listings;

pub async fn fetch_one<C: Context>(ctx: &C, listing_id: i64) -> ServiceResult<ListingSummary> {
    match listings::fetch_one(ctx, listing_id).await {
        Ok(listing) => Ok(ListingSummary::from(listing)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::ListingsNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_many<C: Context>(
    ctx: &C,
    listing_ids: &[i64],
) -> ServiceResult<Vec<ListingSummary>> {
    match listings::fetch_many(ctx, listing_ids).await {
        Ok(listings) => Ok(listings.into_iter().map(ListingSummary::from).collect()),
        Err(e) => unexpected(e),
    }
}
