use crate::api::RequestContext;
use crate::common::error::ServiceResponse;
use crate::models::conversations::{
    Conversation, ConversationListArgs, ConversationView, CreateConversationArgs,
};
use crate::usecases::conversations;
use axum::Json;
use axum::extract::Query;

pub async fn create(
    ctx: RequestContext,
    Json(args): Json<CreateConversationArgs>,
) -> ServiceResponse<Conversation> {
    let conversation =
        conversations::get_or_create(&ctx, args.buyer_id, args.seller_id, args.listing_id).await?;
    Ok(Json(conversation))
}

pub async fn list(
    ctx: RequestContext,
    Query(args): Query<ConversationListArgs>,
) -> ServiceResponse<Vec<ConversationView>> {
    let conversations = conversations::fetch_for_user(&ctx, args.user_id).await?;
    Ok(Json(conversations))
}
