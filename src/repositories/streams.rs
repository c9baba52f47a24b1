use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult};
use crate::entities::streams::{EventInfo, StreamEntry, StreamReadEntry, StreamReadReply};
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamRangeReply, StreamTrimOptions, StreamTrimmingMode};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// A fan-out topic a client can subscribe to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topic {
    /// Message change events for a single conversation.
    Conversation(u64),
    /// Conversation-list change events for one user.
    UserConversations(i64),
}

impl Display for Topic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Conversation(conversation_id) => {
                write!(f, "conversation:{conversation_id}")
            }
            Topic::UserConversations(user_id) => write!(f, "user:{user_id}:conversations"),
        }
    }
}

impl Topic {
    pub fn parse(topic: &str) -> ServiceResult<Self> {
        if let Some(conversation_id) = topic.strip_prefix("conversation:") {
            let conversation_id = u64::from_str(conversation_id)
                .map_err(|_| AppError::StreamsInvalidTopic)?;
            return Ok(Topic::Conversation(conversation_id));
        }
        match topic
            .strip_prefix("user:")
            .and_then(|rest| rest.strip_suffix(":conversations"))
        {
            Some(user_id) => {
                let user_id =
                    i64::from_str(user_id).map_err(|_| AppError::StreamsInvalidTopic)?;
                Ok(Topic::UserConversations(user_id))
            }
            None => Err(AppError::StreamsInvalidTopic),
        }
    }

    pub fn from_key(key: &str) -> ServiceResult<Self> {
        match key.strip_prefix(const_str::concat!(BASE_KEY, ":")) {
            Some(topic) => Self::parse(topic),
            None => Err(AppError::StreamsInvalidTopic),
        }
    }
}

const BASE_KEY: &str = "marketplace:chat:streams";
const ALL_KEY: &str = const_str::concat!(BASE_KEY, ":*");
fn make_key(topic: Topic) -> String {
    format!("{BASE_KEY}:{topic}")
}

fn make_offsets_key(subscriber_id: Uuid) -> String {
    format!("marketplace:chat:subscribers:{subscriber_id}:stream_offsets")
}

pub async fn fetch_all<C: Context>(ctx: &C) -> anyhow::Result<Vec<String>> {
    let mut redis = ctx.redis().await?;
    let mut iter: redis::AsyncIter<String> = redis.scan_match(ALL_KEY).await?;
    let mut keys = vec![];
    while let Some(stream_key) = iter.next_item().await {
        keys.push(stream_key?);
    }
    Ok(keys)
}

pub async fn publish_event<C: Context + ?Sized>(
    ctx: &C,
    topic: Topic,
    event: &[u8],
    info: EventInfo,
) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    let entry = StreamEntry::new(event, info);
    let _: () = redis.xadd(key, "*", &entry.items()).await?;
    Ok(())
}

pub async fn read_pending_entries<C: Context>(
    ctx: &C,
    subscriber_id: Uuid,
) -> anyhow::Result<Vec<StreamReadEntry>> {
    let mut redis = ctx.redis().await?;
    let mut offsets = get_offsets(&mut redis, subscriber_id).await?;
    if offsets.is_empty() {
        return Ok(vec![]);
    }

    let streams: Vec<&String> = offsets.keys().collect();
    let ids: Vec<&String> = offsets.values().collect();
    let reply: Option<StreamReadReply> = redis.xread(&streams, &ids).await?;
    match reply {
        None => Ok(vec![]),
        Some(reply) => {
            let entries = reply
                .streams
                .into_iter()
                .flat_map(|stream| {
                    if let Some(last) = stream.entries.last() {
                        offsets.insert(stream.stream_key, last.entry_id.clone());
                    } else {
                        offsets.remove(&stream.stream_key);
                    }

                    stream.entries
                })
                .collect::<Vec<_>>();

            // Advance the subscriber's offsets past everything just read
            set_offsets(&mut redis, subscriber_id, offsets).await?;
            Ok(entries)
        }
    }
}

pub async fn is_subscribed<C: Context>(
    ctx: &C,
    subscriber_id: Uuid,
    topic: Topic,
) -> anyhow::Result<bool> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    let offsets_key = make_offsets_key(subscriber_id);
    Ok(redis.hexists(offsets_key, key).await?)
}

pub async fn set_offset<C: Context>(
    ctx: &C,
    subscriber_id: Uuid,
    topic: Topic,
    id: String,
) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    let offsets_key = make_offsets_key(subscriber_id);
    Ok(redis.hset(offsets_key, key, id).await?)
}

pub async fn remove_offset<C: Context>(
    ctx: &C,
    subscriber_id: Uuid,
    topic: Topic,
) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    let offsets_key = make_offsets_key(subscriber_id);
    Ok(redis.hdel(offsets_key, key).await?)
}

pub async fn remove_offsets<C: Context>(ctx: &C, subscriber_id: Uuid) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let offsets_key = make_offsets_key(subscriber_id);
    Ok(redis.del(offsets_key).await?)
}

pub async fn clear_stream<C: Context>(ctx: &C, topic: Topic) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    Ok(redis.del(key).await?)
}

pub async fn get_latest_entry_id<C: Context>(ctx: &C, topic: Topic) -> anyhow::Result<String> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    let entry_ids: StreamRangeReply = redis.xrevrange_count(key, "+", "-", 1).await?;
    match entry_ids.ids.is_empty() {
        true => Ok("0-0".to_string()),
        false => Ok(entry_ids.ids[0].id.clone()),
    }
}

pub async fn trim_entries<C: Context>(
    ctx: &C,
    topic: Topic,
    min_id: &str,
) -> anyhow::Result<usize> {
    let mut redis = ctx.redis().await?;
    let key = make_key(topic);
    let removed_count = redis
        .xtrim_options(
            key,
            &StreamTrimOptions::minid(StreamTrimmingMode::Exact, min_id),
        )
        .await?;
    Ok(removed_count)
}

/// Stream entry ids are `<unix-ms>-<seq>`; the timestamp half orders them.
pub fn parse_entry_timestamp(entry_id: &str) -> ServiceResult<DateTime<Utc>> {
    let millis = entry_id
        .split_once('-')
        .map(|(millis, _)| millis)
        .unwrap_or(entry_id);
    let millis = i64::from_str(millis).map_err(|_| AppError::StreamsInvalidTopic)?;
    DateTime::from_timestamp_millis(millis).ok_or(AppError::StreamsInvalidTopic)
}

// utility
async fn get_offsets(
    redis: &mut MultiplexedConnection,
    subscriber_id: Uuid,
) -> anyhow::Result<HashMap<String, String>> {
    let offsets_key = make_offsets_key(subscriber_id);
    Ok(redis.hgetall(offsets_key).await?)
}

async fn set_offsets(
    redis: &mut MultiplexedConnection,
    subscriber_id: Uuid,
    offsets: HashMap<String, String>,
) -> anyhow::Result<()> {
    let offsets_key = make_offsets_key(subscriber_id);
    let items: Vec<(&str, &str)> = offsets
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    Ok(redis.hset_multiple(offsets_key, items.as_slice()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_display_round_trips_through_parse() {
        let topic = Topic::Conversation(42);
        assert_eq!(topic.to_string(), "conversation:42");
        assert_eq!(Topic::parse("conversation:42").unwrap(), topic);

        let topic = Topic::UserConversations(7);
        assert_eq!(topic.to_string(), "user:7:conversations");
        assert_eq!(Topic::parse("user:7:conversations").unwrap(), topic);
    }

    #[test]
    fn invalid_topics_are_rejected() {
        assert!(Topic::parse("conversation:abc").is_err());
        assert!(Topic::parse("user:7").is_err());
        assert!(Topic::parse("presence:7").is_err());
    }

    #[test]
    fn from_key_requires_the_base_prefix() {
        let key = format!("{BASE_KEY}:conversation:3");
        assert_eq!(Topic::from_key(&key).unwrap(), Topic::Conversation(3));
        assert!(Topic::from_key("conversation:3").is_err());
    }

    #[test]
    fn entry_timestamp_parsing() {
        let ts = parse_entry_timestamp("1700000000000-0").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
        assert!(parse_entry_timestamp("not-an-id").is_err());
    }
}
