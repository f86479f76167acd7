//! Fetch Cache - TTL-gated fetch caching
//!
//! Provides a timestamped key/value store with lazy TTL validity checks,
//! best-effort durable mirroring, a fetch wrapper for consumers, and a
//! read-through HTTP gateway built on top of them.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod upstream;

pub use api::AppState;
pub use cache::{CacheStore, SharedStore};
pub use config::Config;
pub use fetch::{CachedFetch, FetchOutcome, FetchState};
