use redis::{FromRedisValue, RedisError, RedisResult, Value};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// A single XADD entry: the JSON-encoded change event plus a delivery
/// envelope describing who should not receive it.
pub struct StreamEntry<'a> {
    event: &'a [u8],
    info: String,
}

impl<'a> StreamEntry<'a> {
    pub fn new(event: &'a [u8], info: EventInfo) -> Self {
        let info = serde_json::to_string(&info).unwrap();
        Self { event, info }
    }

    pub fn items(&'a self) -> [(&'static str, &'a [u8]); 2] {
        [("event", self.event), ("info", self.info.as_bytes())]
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EventInfo {
    pub excluded_subscriber_ids: Option<Vec<Uuid>>,
}

#[derive(Debug)]
pub struct StreamReadReply {
    pub streams: Vec<StreamReply>,
}

#[derive(Debug)]
pub struct StreamReply {
    pub stream_key: String,
    pub entries: Vec<StreamReadEntry>,
}

#[derive(Debug)]
pub struct StreamReadEntry {
    pub entry_id: String,
    pub event: Vec<u8>,
    pub info: EventInfo,
}

macro_rules! array {
    ($e:expr) => {
        match $e {
            Value::Array(a) => a,
            v => return Err(invalid_stream_response(v)),
        }
    };
}

fn process_stream_entry(entry: &Value) -> RedisResult<StreamReadEntry> {
    let entry = array!(entry);
    let entry_id = String::from_redis_value(&entry[0])?;

    let mut event = None;
    let mut info = None;
    for chunk in array!(&entry[1]).chunks_exact(2) {
        let key = String::from_redis_value(&chunk[0])?;
        let value = <Vec<u8>>::from_redis_value(&chunk[1])?;
        if key == "event" {
            event = Some(value);
        } else if key == "info" {
            info = Some(serde_json::from_slice(&value).expect("failed to deserialize info"));
        } else {
            warn!("Unknown redis stream entry key: {key}");
        }
    }
    let event = event.unwrap();
    let info = info.unwrap();
    Ok(StreamReadEntry {
        entry_id,
        event,
        info,
    })
}

fn process_stream_reply(reply: &Vec<Value>) -> RedisResult<StreamReply> {
    let stream_key = String::from_redis_value(&reply[0])?;
    let entries = array!(&reply[1]);
    let entries = entries
        .iter()
        .map(process_stream_entry)
        .collect::<RedisResult<Vec<_>>>()?;
    Ok(StreamReply {
        stream_key,
        entries,
    })
}

impl FromRedisValue for StreamReadReply {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let stream_replies = array!(v);
        let mut streams = vec![];
        for reply in stream_replies {
            let reply = array!(reply);
            let stream = process_stream_reply(reply)?;
            streams.push(stream);
        }

        Ok(StreamReadReply { streams })
    }
}

fn invalid_stream_response(value: &Value) -> RedisError {
    redis::RedisError::from((
        redis::ErrorKind::TypeError,
        "Response was of incompatible type",
        format!(
            "Response type not string compatible. (response was {:?})",
            value
        ),
    ))
}
