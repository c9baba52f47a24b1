use crate::common::context::Context;
use crate::common::error::{ServiceResult, unexpected};
use crate::entities::streams::EventInfo;
use crate::models::events::ChangeEvent;
use crate::repositories::streams;
use crate::repositories::streams::Topic;
use chrono::{DateTime, TimeDelta, Utc};
use std::ops::Sub;
use tracing::warn;
use uuid::Uuid;

pub async fn fetch_all<C: Context>(ctx: &C) -> ServiceResult<Vec<String>> {
    match streams::fetch_all(ctx).await {
        Ok(streams) => Ok(streams),
        Err(e) => unexpected(e),
    }
}

/// Records the topic's current tail as the subscriber's starting offset.
/// Nothing published before this point is ever delivered; gap recovery is
/// the client's full re-fetch. Re-subscribing is a no-op, so a duplicate
/// subscribe call cannot skip events buffered since the first one.
pub async fn subscribe<C: Context>(
    ctx: &C,
    subscriber_id: Uuid,
    topic: Topic,
) -> ServiceResult<()> {
    if streams::is_subscribed(ctx, subscriber_id, topic).await? {
        return Ok(());
    }
    let latest_entry_id = streams::get_latest_entry_id(ctx, topic).await?;
    streams::set_offset(ctx, subscriber_id, topic, latest_entry_id).await?;
    Ok(())
}

pub async fn unsubscribe<C: Context>(
    ctx: &C,
    subscriber_id: Uuid,
    topic: Topic,
) -> ServiceResult<()> {
    streams::remove_offset(ctx, subscriber_id, topic).await?;
    Ok(())
}

pub async fn unsubscribe_all<C: Context>(ctx: &C, subscriber_id: Uuid) -> ServiceResult<()> {
    match streams::remove_offsets(ctx, subscriber_id).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn publish<C: Context>(
    ctx: &C,
    topic: Topic,
    event: &ChangeEvent,
    excluded_subscriber_ids: Option<Vec<Uuid>>,
) -> ServiceResult<()> {
    let payload = serde_json::to_vec(event)?;
    match streams::publish_event(
        ctx,
        topic,
        &payload,
        EventInfo {
            excluded_subscriber_ids,
        },
    )
    .await
    {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Drains everything published past the subscriber's offsets on all of its
/// topics, in stream order.
pub async fn poll<C: Context>(ctx: &C, subscriber_id: Uuid) -> ServiceResult<Vec<ChangeEvent>> {
    let entries = streams::read_pending_entries(ctx, subscriber_id).await?;
    let mut events = Vec::with_capacity(entries.len());
    for entry in entries {
        let is_excluded = entry
            .info
            .excluded_subscriber_ids
            .is_some_and(|excluded| excluded.contains(&subscriber_id));
        if is_excluded {
            continue;
        }
        match serde_json::from_slice(&entry.event) {
            Ok(event) => events.push(event),
            Err(e) => warn!(
                entry_id = entry.entry_id,
                "Skipping undecodable stream event: {e}"
            ),
        }
    }
    Ok(events)
}

pub async fn clear_stream<C: Context>(ctx: &C, topic: Topic) -> ServiceResult<()> {
    match streams::clear_stream(ctx, topic).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn get_latest_entry_timestamp<C: Context>(
    ctx: &C,
    topic: Topic,
) -> ServiceResult<DateTime<Utc>> {
    let latest_entry_id = streams::get_latest_entry_id(ctx, topic).await?;
    streams::parse_entry_timestamp(&latest_entry_id)
}

pub async fn trim_stream<C: Context>(
    ctx: &C,
    topic: Topic,
    ttl_seconds: i64,
) -> ServiceResult<usize> {
    let min_timestamp = Utc::now().sub(TimeDelta::seconds(ttl_seconds));
    let min_id = format!("{}-0", min_timestamp.timestamp_millis());
    match streams::trim_entries(ctx, topic, &min_id).await {
        Ok(count) => Ok(count),
        Err(e) => unexpected(e),
    }
}
