//! API Module
//!
//! HTTP handlers and routing for the vehicle listing REST API.
//!
//! # Endpoints
//! - `/api/vehicles` - Vehicle CRUD and search
//! - `/api/images` - Vehicle gallery images
//! - `/api/lookups/:kind` - Brands, colors, categories and optionals
//! - `/cache`, `/cache/stats`, `/cache/keys` - Cache administration
//! - `GET /health` - Health check endpoint

pub mod extract;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use extract::{ApiJson, ApiQuery};
pub use routes::create_router;
