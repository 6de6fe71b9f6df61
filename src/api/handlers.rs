//! API Handlers
//!
//! HTTP request handlers for each items service endpoint. Each item handler
//! validates its input, then makes one accessor call.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use crate::accessor::CacheAside;
use crate::config::Config;
use crate::error::{ApiError, CacheError, Result, StoreError};
use crate::models::{
    CacheHealth, CreateItemRequest, DatabaseHealth, HealthResponse, Item, ServiceInfoResponse,
    StatsResponse, UpdateItemRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside access to items
    pub accessor: Arc<CacheAside>,
    /// Deployment environment name
    pub environment: String,
    /// Version reported by the service
    pub version: String,
}

impl AppState {
    /// Creates a new AppState around the given accessor.
    pub fn new(
        accessor: CacheAside,
        environment: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            accessor: Arc::new(accessor),
            environment: environment.into(),
            version: version.into(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(accessor: CacheAside, config: &Config) -> Self {
        Self::new(accessor, &config.environment, &config.app_version)
    }

    fn exposes_error_details(&self) -> bool {
        self.environment == "development"
    }

    /// Logs a store failure and turns it into a client-facing error.
    fn failure(&self, message: &str, err: StoreError) -> ApiError {
        error!("{}: {}", message, err);
        ApiError::failed(message, &err, self.exposes_error_details())
    }
}

/// Parses an item id path segment.
fn parse_item_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| ApiError::InvalidRequest("Invalid item ID".to_string()))
}

/// Unwraps a JSON body, turning malformed or mistyped payloads into a 400.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
        })
}

fn item_not_found() -> ApiError {
    ApiError::NotFound("Item not found".to_string())
}

/// Handler for GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse::new(state.version.clone()))
}

/// Handler for GET /api/health
///
/// Probes both collaborators. Always answers 200; the body says what is down.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.accessor.store().ping().await {
        Ok(()) => DatabaseHealth {
            connected: true,
            error: None,
        },
        Err(err) => {
            error!("Database health check failed: {}", err);
            DatabaseHealth {
                connected: false,
                error: Some(err.to_string()),
            }
        }
    };

    let backend = state.accessor.cache();
    let probe = if backend.is_ready() {
        backend.ping().await
    } else {
        Err(CacheError::Unavailable)
    };
    let cache = CacheHealth {
        backend: backend.backend_name(),
        connected: probe.is_ok(),
        error: probe.err().map(|err| err.to_string()),
    };

    Json(HealthResponse::new(
        database,
        cache,
        state.environment.clone(),
        state.version.clone(),
    ))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.accessor.stats()))
}

/// Handler for GET /api/items
pub async fn list_items_handler(State(state): State<AppState>) -> Result<Json<Vec<Item>>> {
    let items = state
        .accessor
        .fetch_collection()
        .await
        .map_err(|err| state.failure("Failed to fetch items", err))?;

    Ok(Json(items))
}

/// Handler for GET /api/items/:id
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Item>> {
    let id = parse_item_id(&raw_id)?;

    state
        .accessor
        .fetch_one(id)
        .await
        .map_err(|err| state.failure("Failed to fetch item", err))?
        .map(Json)
        .ok_or_else(item_not_found)
}

/// Handler for POST /api/items
pub async fn create_item_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>)> {
    let new_item = json_body(payload)?
        .validate()
        .map_err(ApiError::InvalidRequest)?;

    let created = state
        .accessor
        .create(&new_item)
        .await
        .map_err(|err| state.failure("Failed to create item", err))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /api/items/:id
///
/// Partial update: fields missing from the body keep their stored value.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: std::result::Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Item>> {
    let id = parse_item_id(&raw_id)?;
    let patch = json_body(payload)?
        .validate()
        .map_err(ApiError::InvalidRequest)?;

    state
        .accessor
        .update(id, &patch)
        .await
        .map_err(|err| state.failure("Failed to update item", err))?
        .map(Json)
        .ok_or_else(item_not_found)
}

/// Handler for DELETE /api/items/:id
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_item_id(&raw_id)?;

    let deleted = state
        .accessor
        .delete(id)
        .await
        .map_err(|err| state.failure("Failed to delete item", err))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(item_not_found())
    }
}
