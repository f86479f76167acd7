//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Also write durable storage; falls back to the configured default
    #[serde(default)]
    pub persist: Option<bool>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Query string for data routes (GET /data/*path)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQuery {
    /// TTL in milliseconds, gateway default when absent
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Query string for direct reads (GET /get/:key)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    /// Prefer durable storage over memory
    #[serde(default)]
    pub durable: bool,
}

/// Checks a cache key, returning an error message if it is unusable.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "courses", "value": [1, 2]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "courses");
        assert_eq!(req.value, json!([1, 2]));
        assert!(req.persist.is_none());
    }

    #[test]
    fn test_set_request_with_persist() {
        let json = r#"{"key": "k", "value": {"x": 1}, "persist": true}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.persist, Some(true));
    }

    #[test]
    fn test_validate_keys() {
        assert!(validate_key("").is_some());
        assert!(validate_key(&"x".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key("universities/1/courses").is_none());
    }

    #[test]
    fn test_queries_default() {
        let data: DataQuery = serde_json::from_str("{}").unwrap();
        assert!(data.ttl.is_none());
        let get: GetQuery = serde_json::from_str("{}").unwrap();
        assert!(!get.durable);
    }
}
