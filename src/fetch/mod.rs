//! Fetch Module
//!
//! TTL-gated fetch wrapper exposing a `{data, loading}` contract to consumers.

mod cached_fetch;

pub use cached_fetch::{CachedFetch, FetchOutcome, FetchState, UnmountHandle, DEFAULT_TTL};
