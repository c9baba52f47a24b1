use crate::api::RequestContext;
use crate::common::error::{AppError, ServiceResponse};
use crate::models::messages::{
    DeleteMessageArgs, EditMessageArgs, MarkReadArgs, MarkReadResponse, Message, SendMessageArgs,
    UnreadCountsArgs, UnreadCountsResponse,
};
use crate::usecases::messages;
use axum::Json;
use axum::extract::{Path, Query};
use std::str::FromStr;

pub async fn history(
    ctx: RequestContext,
    Path(conversation_id): Path<u64>,
) -> ServiceResponse<Vec<Message>> {
    let messages = messages::fetch_for_conversation(&ctx, conversation_id).await?;
    Ok(Json(messages))
}

pub async fn send(
    ctx: RequestContext,
    Path(conversation_id): Path<u64>,
    Json(args): Json<SendMessageArgs>,
) -> ServiceResponse<Message> {
    let message = messages::send(
        &ctx,
        conversation_id,
        args.sender_id,
        &args.content,
        args.subscriber_id,
    )
    .await?;
    Ok(Json(message))
}

pub async fn edit(
    ctx: RequestContext,
    Path(message_id): Path<u64>,
    Json(args): Json<EditMessageArgs>,
) -> ServiceResponse<Message> {
    let message = messages::edit(
        &ctx,
        message_id,
        args.editor_id,
        &args.content,
        args.subscriber_id,
    )
    .await?;
    Ok(Json(message))
}

pub async fn delete(
    ctx: RequestContext,
    Path(message_id): Path<u64>,
    Json(args): Json<DeleteMessageArgs>,
) -> ServiceResponse<()> {
    messages::delete(&ctx, message_id, args.sender_id, args.subscriber_id).await?;
    Ok(Json(()))
}

pub async fn mark_read(
    ctx: RequestContext,
    Path(conversation_id): Path<u64>,
    Json(args): Json<MarkReadArgs>,
) -> ServiceResponse<MarkReadResponse> {
    let marked_read =
        messages::mark_read(&ctx, conversation_id, args.reader_id, args.subscriber_id).await?;
    Ok(Json(MarkReadResponse { marked_read }))
}

pub async fn unread_counts(
    ctx: RequestContext,
    Query(args): Query<UnreadCountsArgs>,
) -> ServiceResponse<UnreadCountsResponse> {
    let conversation_ids = args
        .conversation_ids
        .split(',')
        .filter(|part| !part.is_empty())
        .map(u64::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| AppError::DecodingRequestFailed)?;
    let counts = messages::unread_counts(&ctx, &conversation_ids, args.user_id).await?;
    Ok(Json(UnreadCountsResponse { counts }))
}
