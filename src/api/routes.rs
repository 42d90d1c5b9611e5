//! API Routes
//!
//! Configures the Axum router with every endpoint.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_keys, cache_stats, create_image, create_lookup, create_vehicle, delete_image,
    delete_lookup, delete_vehicle, flush_cache, get_image, get_vehicle, health_handler,
    list_lookups, list_vehicle_images, list_vehicles, search_vehicles, update_image,
    update_vehicle, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|POST /api/vehicles` - List (cached) or create vehicles
/// - `GET /api/vehicles/search` - Filtered, paginated search (cached)
/// - `GET|PUT|DELETE /api/vehicles/:id` - Single vehicle
/// - `GET /api/vehicles/:id/images` - A vehicle's gallery
/// - `POST /api/images`, `GET|PUT|DELETE /api/images/:id` - Gallery images
/// - `GET|POST /api/lookups/:kind` - Brands, colors, categories or optionals
/// - `DELETE /api/lookups/:kind/:id` - Remove an unreferenced lookup
/// - `GET /cache/stats` - Cache statistics
/// - `GET /cache/keys` - Live cache entries and their remaining TTL
/// - `DELETE /cache` - Flush the cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/search", get(search_vehicles))
        .route(
            "/vehicles/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/vehicles/:id/images", get(list_vehicle_images))
        .route("/images", post(create_image))
        .route(
            "/images/:id",
            get(get_image).put(update_image).delete(delete_image),
        )
        .route("/lookups/:kind", get(list_lookups).post(create_lookup))
        .route("/lookups/:kind/:id", delete(delete_lookup));

    Router::new()
        .nest("/api", api)
        .route("/cache", delete(flush_cache))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/keys", get(cache_keys))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
