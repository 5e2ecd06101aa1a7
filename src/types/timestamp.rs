//! Timestamps reported in GitHub payloads.
//!
//! Entity timestamps (`created_at`, `updated_at`, ...) are carried as the raw
//! value GitHub sent and are reported as unavailable when asked for a parsed
//! time. No parsing format is assumed; consumers that need a real instant can
//! parse [`Timestamp::raw`] themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A timestamp field whose parsed value is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Timestamp {
    raw: Option<String>,
}

impl Timestamp {
    /// Wraps a raw provider value.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Timestamp {
            raw: Some(raw.into()),
        }
    }

    /// A timestamp that was absent (or `null`) in the payload.
    pub fn missing() -> Self {
        Timestamp { raw: None }
    }

    /// The value exactly as GitHub sent it.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The parsed instant. Always `None`: timestamps are not parsed.
    pub fn value(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Whether a parsed instant is available. Always `false`.
    pub fn is_available(&self) -> bool {
        self.value().is_some()
    }
}

/// GitHub sends ISO-8601 strings for most timestamps and epoch seconds for a
/// few (`pushed_at` inside push payloads). Both are kept verbatim.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Epoch(i64),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
        Ok(Timestamp {
            raw: raw.map(|r| match r {
                RawTimestamp::Text(s) => s,
                RawTimestamp::Epoch(n) => n.to_string(),
            }),
        })
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}
