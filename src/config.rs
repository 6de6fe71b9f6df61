//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::accessor::CachePolicy;

/// Which fast cache backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// Remote Redis server at `REDIS_URL`
    Redis,
    /// In-process TTL map
    Memory,
    /// No cache; every read goes to the store
    None,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// sqlx connection URL of the durable store
    pub database_url: String,
    /// Upper bound on pooled store connections
    pub db_max_connections: u32,
    /// Fast cache backend
    pub cache_backend: CacheBackend,
    /// Redis connection URL, used when the backend is Redis
    pub redis_url: String,
    /// TTL in seconds of the cached item listing
    pub collection_ttl: u64,
    /// TTL in seconds of a cached single item
    pub item_ttl: u64,
    /// Maximum number of items a listing returns
    pub list_limit: u32,
    /// Entry limit of the in-process cache
    pub memory_cache_max_entries: usize,
    /// In-process cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// Deployment environment name
    pub environment: String,
    /// Version reported by the service
    pub app_version: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_URL` - store URL (default: sqlite:items.db)
    /// - `DB_MAX_CONNECTIONS` - pool size (default: 10)
    /// - `CACHE_BACKEND` - redis, memory or none (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `COLLECTION_CACHE_TTL` - listing TTL in seconds (default: 60)
    /// - `ITEM_CACHE_TTL` - item TTL in seconds (default: 300)
    /// - `LIST_LIMIT` - maximum listing size (default: 100)
    /// - `MEMORY_CACHE_MAX_ENTRIES` - in-process cache size (default: 1000)
    /// - `CLEANUP_INTERVAL` - sweep frequency in seconds (default: 1)
    /// - `ENVIRONMENT` - environment name (default: development)
    /// - `APP_VERSION` - reported version (default: crate version)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env("PORT", defaults.server_port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            cache_backend: parse_env("CACHE_BACKEND", defaults.cache_backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            collection_ttl: parse_env("COLLECTION_CACHE_TTL", defaults.collection_ttl),
            item_ttl: parse_env("ITEM_CACHE_TTL", defaults.item_ttl),
            list_limit: parse_env("LIST_LIMIT", defaults.list_limit),
            memory_cache_max_entries: parse_env(
                "MEMORY_CACHE_MAX_ENTRIES",
                defaults.memory_cache_max_entries,
            ),
            cleanup_interval: parse_env("CLEANUP_INTERVAL", defaults.cleanup_interval),
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            app_version: env::var("APP_VERSION").unwrap_or(defaults.app_version),
        }
    }

    /// Cache expiry and listing bound derived from this configuration.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            collection_ttl: Duration::from_secs(self.collection_ttl),
            item_ttl: Duration::from_secs(self.item_ttl),
            list_limit: self.list_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_url: "sqlite:items.db".to_string(),
            db_max_connections: 10,
            cache_backend: CacheBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            collection_ttl: 60,
            item_ttl: 300,
            list_limit: 100,
            memory_cache_max_entries: 1000,
            cleanup_interval: 1,
            environment: "development".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Reads and parses `name`, falling back to `default` when unset or invalid.
fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.collection_ttl, 60);
        assert_eq!(config.item_ttl, 300);
        assert_eq!(config.list_limit, 100);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "PORT",
            "DATABASE_URL",
            "DB_MAX_CONNECTIONS",
            "CACHE_BACKEND",
            "COLLECTION_CACHE_TTL",
            "ITEM_CACHE_TTL",
            "LIST_LIMIT",
            "ENVIRONMENT",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_url, "sqlite:items.db");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_cache_policy_from_config() {
        let config = Config {
            collection_ttl: 30,
            item_ttl: 600,
            list_limit: 5,
            ..Config::default()
        };
        let policy = config.cache_policy();
        assert_eq!(policy.collection_ttl, Duration::from_secs(30));
        assert_eq!(policy.item_ttl, Duration::from_secs(600));
        assert_eq!(policy.list_limit, 5);
    }

    #[test]
    fn test_cache_backend_parse() {
        assert_eq!("redis".parse::<CacheBackend>(), Ok(CacheBackend::Redis));
        assert_eq!(" Memory ".parse::<CacheBackend>(), Ok(CacheBackend::Memory));
        assert_eq!("none".parse::<CacheBackend>(), Ok(CacheBackend::None));
        assert!("memcached".parse::<CacheBackend>().is_err());
    }
}
