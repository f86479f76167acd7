//! Cache Module
//!
//! Provides an in-memory key/value store with write timestamps, lazy TTL
//! validity checks and best-effort durable mirroring.

pub mod durable;
mod entry;
mod stats;
mod store;
mod validity;


// Re-export public types
pub use durable::{DurableStorage, FileDurable, MemoryDurable};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::{CacheStore, SharedStore};
pub use validity::{is_valid, is_valid_at, EmptyPolicy, Payload};
