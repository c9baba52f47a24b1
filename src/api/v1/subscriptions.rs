use crate::api::RequestContext;
use crate::common::error::ServiceResponse;
use crate::models::events::{EventsResponse, SubscribeArgs, SubscriptionAck, UnsubscribeArgs};
use crate::repositories::streams::Topic;
use crate::usecases::streams;
use axum::Json;
use axum::extract::Path;
use uuid::Uuid;

pub async fn subscribe(
    ctx: RequestContext,
    Json(args): Json<SubscribeArgs>,
) -> ServiceResponse<SubscriptionAck> {
    let topic = Topic::parse(&args.topic)?;
    streams::subscribe(&ctx, args.subscriber_id, topic).await?;
    Ok(Json(SubscriptionAck {
        subscriber_id: args.subscriber_id,
        topic: Some(args.topic),
    }))
}

pub async fn unsubscribe(
    ctx: RequestContext,
    Json(args): Json<UnsubscribeArgs>,
) -> ServiceResponse<SubscriptionAck> {
    match &args.topic {
        Some(topic) => {
            let topic = Topic::parse(topic)?;
            streams::unsubscribe(&ctx, args.subscriber_id, topic).await?;
        }
        None => streams::unsubscribe_all(&ctx, args.subscriber_id).await?,
    }
    Ok(Json(SubscriptionAck {
        subscriber_id: args.subscriber_id,
        topic: args.topic,
    }))
}

pub async fn poll(
    ctx: RequestContext,
    Path(subscriber_id): Path<Uuid>,
) -> ServiceResponse<EventsResponse> {
    let events = streams::poll(&ctx, subscriber_id).await?;
    Ok(Json(EventsResponse { events }))
}
