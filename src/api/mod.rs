//! API Module
//!
//! HTTP handlers and routing for the items REST API.
//!
//! # Endpoints
//! - `GET /` - Service description
//! - `GET /api/health` - Store and cache connectivity
//! - `GET /api/stats` - Cache-aside counters
//! - `GET /api/items` - List recent items
//! - `POST /api/items` - Create an item
//! - `GET /api/items/:id` - Fetch one item
//! - `PUT /api/items/:id` - Partially update an item
//! - `DELETE /api/items/:id` - Delete an item

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
