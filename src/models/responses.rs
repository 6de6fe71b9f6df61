//! Response DTOs for the items API
//!
//! Defines the structure of outgoing HTTP response bodies. Items themselves
//! are serialized directly.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::accessor::StatsSnapshot;

/// Response body for the root endpoint (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl ServiceInfoResponse {
    /// Creates the service description for the given version
    pub fn new(version: impl Into<String>) -> Self {
        let endpoints = BTreeMap::from([
            ("health", "/api/health"),
            ("stats", "/api/stats"),
            ("items", "/api/items"),
            ("itemById", "/api/items/:id"),
        ]);
        Self {
            message: "Welcome to the items API".to_string(),
            version: version.into(),
            endpoints,
        }
    }
}

/// Durable store section of the health report
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub error: Option<String>,
}

/// Fast cache section of the health report
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    pub connected: bool,
    pub error: Option<String>,
}

/// Response body for the health endpoint (GET /api/health)
///
/// The service reports `ok` even when a collaborator is down; the sections
/// say which one.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (always "ok" when the process answers)
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub database: DatabaseHealth,
    pub cache: CacheHealth,
    pub environment: String,
    pub version: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn new(
        database: DatabaseHealth,
        cache: CacheHealth,
        environment: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            database,
            cache,
            environment: environment.into(),
            version: version.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /api/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads served from the cache
    pub hits: u64,
    /// Reads where the cache answered without a usable entry
    pub misses: u64,
    /// Reads where the cache was not ready or errored
    pub unavailable: u64,
    /// Reads that went to the durable store
    pub store_reads: u64,
    /// Cache keys deleted after writes
    pub invalidations: u64,
    /// Hit rate (hits / all cache lookups)
    pub hit_rate: f64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            unavailable: stats.unavailable,
            store_reads: stats.store_reads,
            invalidations: stats.invalidations,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Underlying cause, only attached in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self::with_details(error, None)
    }

    /// Creates an ErrorResponse carrying an optional cause
    pub fn with_details(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: error.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_hit_rate() {
        let resp = StatsResponse::from(StatsSnapshot {
            hits: 80,
            misses: 15,
            unavailable: 5,
            store_reads: 20,
            invalidations: 3,
        });
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(StatsSnapshot::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::new(
            DatabaseHealth {
                connected: true,
                error: None,
            },
            CacheHealth {
                backend: "memory",
                connected: false,
                error: Some("Cache unavailable".to_string()),
            },
            "development",
            "1.0.0",
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"]["connected"], true);
        assert_eq!(json["cache"]["backend"], "memory");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("Item not found")).unwrap();
        assert_eq!(json, r#"{"error":"Item not found"}"#);
    }

    #[test]
    fn test_service_info_lists_endpoints() {
        let info = ServiceInfoResponse::new("1.2.3");
        assert_eq!(info.endpoints["items"], "/api/items");
        assert_eq!(info.version, "1.2.3");
    }
}
