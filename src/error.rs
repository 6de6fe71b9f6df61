//! Error types for the items service
//!
//! Provides unified error handling using thiserror. Store and cache failures
//! have their own types; `ApiError` is what handlers return to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Failure reported by the durable item store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query, connection or pool failure from the database driver
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// == Cache Error ==
/// Failure reported by a fast cache backend.
///
/// Never surfaced to clients; the accessor folds these into the miss path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Backend could not be reached
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),

    /// Backend was reached but the command failed
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),

    /// Backend is switched off or not ready
    #[error("Cache unavailable")]
    Unavailable,

    /// In-process backend reached its entry limit
    #[error("Cache full: {0}")]
    CacheFull(String),
}

// == API Error ==
/// Error returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested item does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request failed validation before reaching any collaborator
    #[error("{0}")]
    InvalidRequest(String),

    /// A collaborator failed; `details` carries the cause when exposed
    #[error("{message}")]
    Failed {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Builds a generic failure, attaching the cause only when `expose_details` is set.
    pub fn failed(message: impl Into<String>, cause: &StoreError, expose_details: bool) -> Self {
        Self::Failed {
            message: message.into(),
            details: expose_details.then(|| cause.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            ApiError::Failed { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_details(message, details),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Result type for durable store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for fast cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_hides_details_outside_development() {
        let cause = StoreError::Database(sqlx::Error::PoolTimedOut);
        let err = ApiError::failed("Failed to fetch items", &cause, false);
        assert!(matches!(err, ApiError::Failed { details: None, .. }));
    }

    #[test]
    fn test_failed_exposes_details_in_development() {
        let cause = StoreError::Database(sqlx::Error::PoolTimedOut);
        let err = ApiError::failed("Failed to fetch items", &cause, true);
        match err {
            ApiError::Failed { message, details } => {
                assert_eq!(message, "Failed to fetch items");
                assert!(details.unwrap().contains("Database error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_codes() {
        let cause = StoreError::Database(sqlx::Error::PoolClosed);
        assert_eq!(
            ApiError::NotFound("Item not found".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidRequest("Invalid item ID".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::failed("boom", &cause, false)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Cache connection failed: refused");
        assert_eq!(CacheError::Unavailable.to_string(), "Cache unavailable");
    }
}
