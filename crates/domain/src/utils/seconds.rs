//! Serde adapters for durations carried as whole seconds on the wire.
//!
//! Decoding rejects negative values and values outside chrono's range.
//! Encoding truncates, so callers validate with [`is_whole`] first.

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serializer};

/// True when `value` has no sub-second part and survives encoding intact.
pub fn is_whole(value: Duration) -> bool {
    value.subsec_nanos() == 0
}

fn from_wire<E: serde::de::Error>(secs: i64) -> Result<Duration, E> {
    if secs < 0 {
        return Err(E::custom(format!("duration cannot be negative, got {secs}s")));
    }
    Duration::try_seconds(secs)
        .ok_or_else(|| E::custom(format!("duration out of range: {secs}s")))
}

pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(value.num_seconds())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    from_wire(i64::deserialize(deserializer)?)
}

/// Same as the parent module for `Option<Duration>` fields.
pub mod option {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&duration.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<i64>::deserialize(deserializer)?
            .map(super::from_wire)
            .transpose()
    }
}
