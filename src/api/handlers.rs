//! API Handlers
//!
//! HTTP request handlers for vehicles, lookups and cache administration.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use super::extract::{ApiJson, ApiQuery};
use crate::cache::{CacheStore, KeyInfo, SharedCache};
use crate::error::Result;
use crate::models::{
    CreateImageRequest, CreateLookupRequest, CreateVehicleRequest, FlushResponse, HealthResponse,
    Lookup, LookupKind, StatsResponse, UpdateImageRequest, UpdateVehicleRequest, VehicleDetails,
    VehicleImage, VehicleSearchQuery,
};
use crate::repository::{InMemoryVehicleRepository, VehicleRepository};
use crate::services::VehicleService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response cache, also held by the sweep task
    pub cache: SharedCache,
    pub vehicles: VehicleService,
}

impl AppState {
    /// Creates state over an existing cache store and repository.
    pub fn new(cache: CacheStore, repo: Arc<dyn VehicleRepository>) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        Self {
            vehicles: VehicleService::new(repo, cache.clone()),
            cache,
        }
    }

    /// Creates state from configuration with an empty in-memory repository.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            CacheStore::new(config.default_ttl),
            Arc::new(InMemoryVehicleRepository::new()),
        )
    }
}

// == Vehicles ==

/// GET /api/vehicles
pub async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(Json(state.vehicles.list().await?))
}

/// GET /api/vehicles/search
pub async fn search_vehicles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VehicleSearchQuery>,
) -> Result<Json<Value>> {
    Ok(Json(state.vehicles.search(&query).await?))
}

/// GET /api/vehicles/:id
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<VehicleDetails>> {
    Ok(Json(state.vehicles.get(id).await?))
}

/// POST /api/vehicles
///
/// Returns 201 Created with the stored vehicle.
pub async fn create_vehicle(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleDetails>)> {
    let created = state.vehicles.create(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/vehicles/:id
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    ApiJson(req): ApiJson<UpdateVehicleRequest>,
) -> Result<Json<VehicleDetails>> {
    Ok(Json(state.vehicles.update(id, req).await?))
}

/// DELETE /api/vehicles/:id
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode> {
    state.vehicles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// == Lookups ==

/// GET /api/lookups/:kind
pub async fn list_lookups(
    State(state): State<AppState>,
    Path(kind): Path<LookupKind>,
) -> Result<Json<Value>> {
    Ok(Json(state.vehicles.list_lookups(kind).await?))
}

/// POST /api/lookups/:kind
pub async fn create_lookup(
    State(state): State<AppState>,
    Path(kind): Path<LookupKind>,
    ApiJson(req): ApiJson<CreateLookupRequest>,
) -> Result<(StatusCode, Json<Lookup>)> {
    let lookup = state.vehicles.create_lookup(kind, req).await?;
    Ok((StatusCode::CREATED, Json(lookup)))
}

/// DELETE /api/lookups/:kind/:id
pub async fn delete_lookup(
    State(state): State<AppState>,
    Path((kind, id)): Path<(LookupKind, u32)>,
) -> Result<StatusCode> {
    state.vehicles.delete_lookup(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// == Images ==

/// GET /api/vehicles/:id/images
pub async fn list_vehicle_images(
    State(state): State<AppState>,
    Path(vehicle_id): Path<u32>,
) -> Result<Json<Vec<VehicleImage>>> {
    Ok(Json(state.vehicles.list_images(vehicle_id).await?))
}

/// GET /api/images/:id
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<VehicleImage>> {
    Ok(Json(state.vehicles.get_image(id).await?))
}

/// POST /api/images
pub async fn create_image(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateImageRequest>,
) -> Result<(StatusCode, Json<VehicleImage>)> {
    let image = state.vehicles.create_image(req).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// PUT /api/images/:id
pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    ApiJson(req): ApiJson<UpdateImageRequest>,
) -> Result<Json<VehicleImage>> {
    Ok(Json(state.vehicles.update_image(id, req).await?))
}

/// DELETE /api/images/:id
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode> {
    state.vehicles.delete_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// == Cache Administration ==

/// GET /cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// GET /cache/keys
///
/// Live entries with their age and remaining TTL.
pub async fn cache_keys(State(state): State<AppState>) -> Json<Vec<KeyInfo>> {
    Json(state.cache.read().await.keys())
}

/// DELETE /cache
pub async fn flush_cache(State(state): State<AppState>) -> Json<FlushResponse> {
    let removed = state.cache.write().await.flush();
    info!("Cache flushed, {} entries removed", removed);
    Json(FlushResponse::new(removed))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
