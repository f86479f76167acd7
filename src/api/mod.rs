//! API Module
//!
//! HTTP handlers and routing for the read-through gateway.
//!
//! # Endpoints
//! - `GET /data/*path` - Cached upstream resource
//! - `PUT /set` - Store a JSON value
//! - `GET /get/*key` - Read a value
//! - `DELETE /persisted/*key` - Clear a durable copy
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
