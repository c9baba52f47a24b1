use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::users::UserProfile;
use crate::repositories::users;

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<UserProfile> {
    match users::fetch_one(ctx, user_id).await {
        Ok(user) => Ok(UserProfile::from(user)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::UsersNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_many<C: Context>(ctx: &C, user_ids: &[i64]) -> ServiceResult<Vec<UserProfile>> {
    match users::fetch_many(ctx, user_ids).await {
        Ok(users) => Ok(users.into_iter().map(UserProfile::from).collect()),
        Err(e) => unexpected(e),
    }
}
