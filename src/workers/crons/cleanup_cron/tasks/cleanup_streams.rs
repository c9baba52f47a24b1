use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::repositories::streams::Topic;
use crate::usecases::streams;
use chrono::{TimeDelta, Utc};
use std::ops::Add;
use tracing::{error, info};

const EVENT_TTL: i64 = 5 * 60;
const CLEAR_STREAM_INTERVAL: i64 = 10 * 60;

pub async fn cleanup_streams<C: Context>(ctx: &C) -> ServiceResult<()> {
    let streams = streams::fetch_all(ctx).await?;
    for key in streams {
        match cleanup_stream(ctx, key).await {
            Ok((key, count)) => match count {
                usize::MAX => info!("Cleared Stream {key}"),
                count => info!("Trimmed {count} events from {key}"),
            },
            Err(e) => error!("Cleanup stream error: {e:?}"),
        }
    }

    Ok(())
}

async fn cleanup_stream<C: Context>(ctx: &C, key: String) -> ServiceResult<(String, usize)> {
    let topic = Topic::from_key(&key)?;
    let timestamp = streams::get_latest_entry_timestamp(ctx, topic).await?;
    let now = Utc::now();

    // A topic nobody has published to in the interval is fully deleted
    if timestamp.add(TimeDelta::seconds(CLEAR_STREAM_INTERVAL)) < now {
        streams::clear_stream(ctx, topic).await?;
        Ok((key, usize::MAX))
    } else {
        let count = streams::trim_stream(ctx, topic, EVENT_TTL).await?;
        Ok((key, count))
    }
}
