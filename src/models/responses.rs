//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Where a data route answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Fresh value already in the store
    Cache,
    /// Freshly fetched from upstream
    Upstream,
}

/// Response body for data routes (GET /data/*path)
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse {
    /// Cache key (the resource path)
    pub key: String,
    /// The cached or fetched document
    pub data: Value,
    /// Where the document came from
    pub source: DataSource,
    /// When the value was written to the store (RFC 3339)
    pub written_at: Option<String>,
}

impl DataResponse {
    /// Creates a new DataResponse
    pub fn new(key: impl Into<String>, data: Value, source: DataSource, written_at: Option<u64>) -> Self {
        Self {
            key: key.into(),
            data,
            source,
            written_at: written_at.and_then(format_timestamp_ms),
        }
    }
}

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Whether a durable write was requested
    pub persisted: bool,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, persisted: bool) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            persisted,
        }
    }
}

/// Response body for clearing persisted data (DELETE /persisted/:key)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Outcome message
    pub message: String,
    /// The key whose durable copy was targeted
    pub key: String,
    /// Whether durable storage confirmed the removal
    pub cleared: bool,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(key: impl Into<String>, cleared: bool) -> Self {
        let key = key.into();
        let message = if cleared {
            format!("Persisted copy of '{}' cleared", key)
        } else {
            format!("Persisted copy of '{}' could not be cleared", key)
        };
        Self {
            message,
            key,
            cleared,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Successful fetches
    pub fetches: u64,
    /// Failed fetches
    pub fetch_failures: u64,
    /// Swallowed durable-storage failures
    pub durable_errors: u64,
    /// Current number of entries in memory
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            fetches: stats.fetches,
            fetch_failures: stats.fetch_failures,
            durable_errors: stats.durable_errors,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

fn format_timestamp_ms(ms: u64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(i64::try_from(ms).ok()?).map(|dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_response_serialize() {
        let resp = DataResponse::new("courses", json!([1]), DataSource::Upstream, Some(0));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["source"], "upstream");
        assert_eq!(json["data"], json!([1]));
        assert_eq!(json["written_at"], "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_data_response_without_timestamp() {
        let resp = DataResponse::new("k", json!(null), DataSource::Cache, None);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["source"], "cache");
        assert!(json["written_at"].is_null());
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", true);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_clear_response_message() {
        assert!(ClearResponse::new("k", true).message.contains("cleared"));
        assert!(ClearResponse::new("k", false).message.contains("could not"));
    }

    #[test]
    fn test_stats_response_from_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            fetches: 20,
            fetch_failures: 1,
            durable_errors: 0,
            total_entries: 12,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, 12);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
