//! Domain and transport models for the items API
//!
//! `Item` is the stored record; the request and response modules hold the
//! DTOs used for serializing/deserializing HTTP bodies.

pub mod item;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use item::{Item, ItemPatch, NewItem};
pub use requests::{CreateItemRequest, UpdateItemRequest, MAX_NAME_LENGTH};
pub use responses::{
    CacheHealth, DatabaseHealth, ErrorResponse, HealthResponse, ServiceInfoResponse,
    StatsResponse,
};
