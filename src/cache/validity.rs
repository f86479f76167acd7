//! Validity Predicate
//!
//! Decides at read time whether a cached value is still fresh. Nothing
//! expires in the background; staleness is only ever checked here.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::entry::current_timestamp_ms;

// == Payload ==
/// A cacheable value that knows whether it is "empty".
pub trait Payload {
    /// Returns true if the value carries no data.
    fn is_empty_payload(&self) -> bool;
}

impl<T> Payload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for String {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Payload> Payload for Option<T> {
    fn is_empty_payload(&self) -> bool {
        self.as_ref().map_or(true, Payload::is_empty_payload)
    }
}

impl<K, V> Payload for HashMap<K, V> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` are empty.
impl Payload for Value {
    fn is_empty_payload(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }
}

// == Empty Policy ==
/// How an empty-but-present cached value is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPolicy {
    /// Empty values are never fresh; callers always refetch them.
    #[default]
    Stale,
    /// Empty values are valid cached answers, subject to TTL.
    Fresh,
}

// == Predicates ==
/// Returns true if `value` was written less than `ttl` ago.
///
/// Absent values, absent timestamps and empty values are invalid.
pub fn is_valid<V: Payload>(value: Option<&V>, ttl: Duration, timestamp: Option<u64>) -> bool {
    is_valid_at(
        value,
        ttl,
        timestamp,
        EmptyPolicy::default(),
        current_timestamp_ms(),
    )
}

/// Pure form of [`is_valid`] with an explicit policy and clock reading.
pub fn is_valid_at<V: Payload>(
    value: Option<&V>,
    ttl: Duration,
    timestamp: Option<u64>,
    policy: EmptyPolicy,
    now: u64,
) -> bool {
    let (Some(value), Some(written_at)) = (value, timestamp) else {
        return false;
    };

    if policy == EmptyPolicy::Stale && value.is_empty_payload() {
        return false;
    }

    let age = now.saturating_sub(written_at);
    u128::from(age) < ttl.as_millis()
}
