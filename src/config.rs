//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::EmptyPolicy;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for data routes without an explicit `ttl`
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream JSON service
    pub upstream_url: String,
    /// Upstream request timeout in milliseconds
    pub upstream_timeout_ms: u64,
    /// Directory for durable storage, None = XDG cache dir
    pub durable_dir: Option<PathBuf>,
    /// Whether `PUT /set` persists by default
    pub persist_writes: bool,
    /// Whether an empty payload counts as a fresh cached answer
    pub empty_is_fresh: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: http://localhost:8000)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream timeout (default: 10000)
    /// - `DURABLE_DIR` - Durable storage directory (default: XDG cache dir)
    /// - `PERSIST_WRITES` - Persist `PUT /set` by default (default: false)
    /// - `EMPTY_IS_FRESH` - Treat empty payloads as fresh (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout_ms: parse_var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or(defaults.upstream_timeout_ms),
            durable_dir: env::var("DURABLE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            persist_writes: parse_var("PERSIST_WRITES").unwrap_or(defaults.persist_writes),
            empty_is_fresh: parse_var("EMPTY_IS_FRESH").unwrap_or(defaults.empty_is_fresh),
        }
    }

    /// Default TTL as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    /// Empty-payload policy derived from `empty_is_fresh`.
    pub fn empty_policy(&self) -> EmptyPolicy {
        if self.empty_is_fresh {
            EmptyPolicy::Fresh
        } else {
            EmptyPolicy::Stale
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            server_port: 3000,
            upstream_url: "http://localhost:8000".to_string(),
            upstream_timeout_ms: 10_000,
            durable_dir: None,
            persist_writes: false,
            empty_is_fresh: false,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.upstream_url, "http://localhost:8000");
        assert!(config.durable_dir.is_none());
        assert!(!config.persist_writes);
        assert_eq!(config.empty_policy(), EmptyPolicy::Stale);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("SERVER_PORT");
        env::remove_var("UPSTREAM_URL");
        env::remove_var("UPSTREAM_TIMEOUT_MS");
        env::remove_var("DURABLE_DIR");
        env::remove_var("PERSIST_WRITES");
        env::remove_var("EMPTY_IS_FRESH");

        let config = Config::from_env();
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
        assert!(!config.empty_is_fresh);
    }

    #[test]
    fn test_empty_policy_fresh() {
        let config = Config {
            empty_is_fresh: true,
            ..Config::default()
        };
        assert_eq!(config.empty_policy(), EmptyPolicy::Fresh);
    }
}
