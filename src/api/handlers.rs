//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheStore, EmptyPolicy, SharedStore};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::fetch::{CachedFetch, FetchOutcome};
use crate::models::{
    validate_key, ClearResponse, DataQuery, DataResponse, DataSource, GetQuery, GetResponse,
    HealthResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::upstream::UpstreamClient;

/// Application state shared across all handlers.
///
/// One store instance is created at startup and handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Shared cache store
    pub store: SharedStore<Value>,
    /// Upstream JSON service
    pub upstream: UpstreamClient,
    /// TTL for data routes without `?ttl=`
    pub default_ttl: Duration,
    /// How empty upstream answers are judged
    pub empty_policy: EmptyPolicy,
    /// Default for `persist` on `PUT /set`
    pub persist_writes: bool,
}

impl AppState {
    /// Creates a new AppState with the given store and upstream client.
    pub fn new(store: CacheStore<Value>, upstream: UpstreamClient) -> Self {
        Self::from_config(&Config::default(), store, upstream)
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, store: CacheStore<Value>, upstream: UpstreamClient) -> Self {
        Self {
            store: store.shared(),
            upstream,
            default_ttl: config.default_ttl(),
            empty_policy: config.empty_policy(),
            persist_writes: config.persist_writes,
        }
    }
}

/// Handler for GET /data/*path
///
/// Read-through: serves the cached document while fresh, otherwise fetches
/// `{upstream}/{path}`. Each request is its own consumer.
pub async fn data_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse>> {
    if let Some(error_msg) = validate_key(&path) {
        return Err(GatewayError::InvalidRequest(error_msg));
    }

    let ttl = query
        .ttl
        .map(Duration::from_millis)
        .unwrap_or(state.default_ttl);

    let mut consumer = CachedFetch::new(state.store.clone()).with_policy(state.empty_policy);
    let upstream = state.upstream.clone();
    let resource = path.clone();
    let outcome = consumer
        .load(&path, ttl, || async move { upstream.fetch_json(&resource).await })
        .await;

    let source = match &outcome {
        FetchOutcome::Cached(_) => DataSource::Cache,
        FetchOutcome::Fetched(_) => DataSource::Upstream,
        FetchOutcome::Failed => {
            return Err(GatewayError::Upstream(format!(
                "Failed to fetch '{}' from upstream",
                path
            )))
        }
        FetchOutcome::Discarded => {
            return Err(GatewayError::Internal(format!(
                "Request for '{}' was abandoned",
                path
            )))
        }
    };

    let written_at = outcome.written_at();
    let data = outcome.into_data().unwrap_or(Value::Null);

    Ok(Json(DataResponse::new(path, data, source, written_at)))
}

/// Handler for PUT /set
///
/// Stores a JSON value, optionally mirroring it to durable storage.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(GatewayError::InvalidRequest(error_msg));
    }

    let persist = req.persist.unwrap_or(state.persist_writes);
    state.store.write().await.set(req.key.clone(), req.value, persist);

    Ok(Json(SetResponse::new(req.key, persist)))
}

/// Handler for GET /get/*key
///
/// Reads the store directly; `?durable=true` prefers durable storage.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    // Write lock: lookups update statistics
    let value = state.store.write().await.get(&key, query.durable);

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(GatewayError::NotFound(key)),
    }
}

/// Handler for DELETE /persisted/*key
///
/// Removes the durable copy of a key; the in-memory entry stays.
pub async fn clear_persisted_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ClearResponse> {
    let cleared = state.store.write().await.clear_persisted(&key);
    if cleared {
        info!(key = %key, "Persisted entry cleared");
    }

    Json(ClearResponse::new(key, cleared))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.store.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryDurable;
    use serde_json::json;

    fn offline_upstream() -> UpstreamClient {
        UpstreamClient::new("http://127.0.0.1:9", Duration::from_millis(300)).unwrap()
    }

    fn test_state() -> AppState {
        AppState::new(CacheStore::with_durable(MemoryDurable::new()), offline_upstream())
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "courses".to_string(),
            value: json!(["algebra"]),
            persist: None,
        };
        let response = set_handler(State(state.clone()), Json(req)).await.unwrap();
        assert!(!response.persisted);

        let response = get_handler(
            State(state),
            Path("courses".to_string()),
            Query(GetQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.value, json!(["algebra"]));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(
            State(state),
            Path("nonexistent".to_string()),
            Query(GetQuery::default()),
        )
        .await;
        assert!(matches!(result, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_data_handler_serves_fresh_entry_without_upstream() {
        let state = test_state();
        state.store.write().await.set("professors", json!([{"id": 1}]), false);

        let response = data_handler(
            State(state),
            Path("professors".to_string()),
            Query(DataQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.source, DataSource::Cache);
        assert_eq!(response.data, json!([{"id": 1}]));
        assert!(response.written_at.is_some());
    }

    #[tokio::test]
    async fn test_data_handler_reports_timestamp_of_served_entry() {
        let state = test_state();
        state.store.write().await.set("professors", json!([{"id": 1}]), false);
        let stamp = state.store.read().await.get_timestamp("professors").unwrap();

        let response = data_handler(
            State(state.clone()),
            Path("professors".to_string()),
            Query(DataQuery::default()),
        )
        .await
        .unwrap();

        let expected = DataResponse::new("professors", Value::Null, DataSource::Cache, Some(stamp));
        assert_eq!(response.written_at, expected.written_at);
    }

    #[tokio::test]
    async fn test_data_handler_upstream_failure() {
        let state = test_state();

        let result = data_handler(
            State(state.clone()),
            Path("students".to_string()),
            Query(DataQuery::default()),
        )
        .await;

        assert!(matches!(result, Err(GatewayError::Upstream(_))));
        assert_eq!(state.store.read().await.stats().fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_clear_persisted_handler() {
        let state = test_state();
        let req = SetRequest {
            key: "k".to_string(),
            value: json!({"x": 1}),
            persist: Some(true),
        };
        let stored = set_handler(State(state.clone()), Json(req)).await.unwrap();
        assert!(stored.persisted);

        let response = clear_persisted_handler(State(state.clone()), Path("k".to_string())).await;
        assert!(response.cleared);

        let durable_read = get_handler(
            State(state),
            Path("k".to_string()),
            Query(GetQuery { durable: true }),
        )
        .await
        .unwrap();
        // Durable copy gone, memory fallback still answers
        assert_eq!(durable_read.value, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = SetRequest {
            key: "".to_string(),
            value: json!(1),
            persist: None,
        };
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }
}
