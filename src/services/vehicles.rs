//! Vehicle service.
//!
//! Wraps the repository with request-level rules: list and search reads go
//! through the cache, and every successful write invalidates the cached
//! reads it affects.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::cache::{invalidate, read_through, Namespace, SharedCache};
use crate::error::{AppError, Result};
use crate::models::{
    CreateImageRequest, CreateLookupRequest, CreateVehicleRequest, Lookup, LookupKind,
    SearchPage, UpdateImageRequest, UpdateVehicleRequest, VehicleDetails, VehicleImage,
    VehicleSearchQuery,
};
use crate::repository::VehicleRepository;

const VEHICLE: &str = "Vehicle";
const IMAGE: &str = "Image";

// == Vehicle Service ==
/// Vehicle and lookup operations backed by a repository and the shared
/// response cache. Cloning is cheap.
#[derive(Clone)]
pub struct VehicleService {
    repo: Arc<dyn VehicleRepository>,
    cache: SharedCache,
}

impl VehicleService {
    pub fn new(repo: Arc<dyn VehicleRepository>, cache: SharedCache) -> Self {
        Self { repo, cache }
    }

    /// Key of the cached unfiltered vehicle list.
    pub fn list_key() -> String {
        Namespace::Vehicles.key("all")
    }

    /// Key of a cached lookup list.
    pub fn lookup_key(kind: LookupKind) -> String {
        Namespace::Lookups.key(kind.as_str())
    }

    // == Reads ==
    /// All vehicles ordered by model, served from the cache when fresh.
    pub async fn list(&self) -> Result<Value> {
        read_through(&self.cache, Namespace::Vehicles, &Self::list_key(), || async move {
            Ok(self.repo.list().await?)
        })
        .await
    }

    /// A filtered page of vehicles, cached per canonical query.
    pub async fn search(&self, query: &VehicleSearchQuery) -> Result<Value> {
        query.validate()?;

        let page = query.page_request();
        let filter = query.filter();
        read_through(&self.cache, Namespace::Vehicles, &query.cache_key(), || async move {
            let (total, vehicles) = self.repo.search(&filter, page).await?;
            Ok(SearchPage::new(total, page.page, page.limit, vehicles))
        })
        .await
    }

    pub async fn get(&self, id: u32) -> Result<VehicleDetails> {
        self.repo
            .find(id)
            .await?
            .ok_or(AppError::NotFound { entity: VEHICLE, id })
    }

    // == Writes ==
    pub async fn create(&self, req: CreateVehicleRequest) -> Result<VehicleDetails> {
        req.validate()?;

        let created = self.repo.insert(req.into_new_vehicle()).await?;
        invalidate(&self.cache, Namespace::Vehicles).await;

        info!(id = created.vehicle.id, "vehicle created");
        Ok(created)
    }

    pub async fn update(&self, id: u32, req: UpdateVehicleRequest) -> Result<VehicleDetails> {
        req.validate()?;

        let updated = self
            .repo
            .update(id, req.into_patch())
            .await?
            .ok_or(AppError::NotFound { entity: VEHICLE, id })?;
        invalidate(&self.cache, Namespace::Vehicles).await;

        info!(id, "vehicle updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: u32) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound { entity: VEHICLE, id });
        }
        invalidate(&self.cache, Namespace::Vehicles).await;

        info!(id, "vehicle deleted");
        Ok(())
    }

    // == Lookups ==
    pub async fn list_lookups(&self, kind: LookupKind) -> Result<Value> {
        read_through(&self.cache, Namespace::Lookups, &Self::lookup_key(kind), || async move {
            Ok(self.repo.list_lookups(kind).await?)
        })
        .await
    }

    /// Creates a lookup row. Vehicle payloads embed lookup names, so both
    /// namespaces are dropped.
    pub async fn create_lookup(&self, kind: LookupKind, req: CreateLookupRequest) -> Result<Lookup> {
        req.validate()?;

        let lookup = self.repo.insert_lookup(kind, req.name).await?;
        self.invalidate_lookups().await;

        info!(%kind, id = lookup.id, "lookup created");
        Ok(lookup)
    }

    pub async fn delete_lookup(&self, kind: LookupKind, id: u32) -> Result<()> {
        if !self.repo.delete_lookup(kind, id).await? {
            return Err(AppError::NotFound {
                entity: kind.entity(),
                id,
            });
        }
        self.invalidate_lookups().await;

        info!(%kind, id, "lookup deleted");
        Ok(())
    }

    // == Images ==
    /// A vehicle's gallery. Not cached; vehicle payloads already embed it.
    pub async fn list_images(&self, vehicle_id: u32) -> Result<Vec<VehicleImage>> {
        self.repo
            .list_images(vehicle_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: VEHICLE,
                id: vehicle_id,
            })
    }

    pub async fn get_image(&self, id: u32) -> Result<VehicleImage> {
        self.repo
            .find_image(id)
            .await?
            .ok_or(AppError::NotFound { entity: IMAGE, id })
    }

    pub async fn create_image(&self, req: CreateImageRequest) -> Result<VehicleImage> {
        req.validate()?;

        let image = self.repo.insert_image(req.into_new_image()).await?;
        invalidate(&self.cache, Namespace::Vehicles).await;

        info!(id = image.id, vehicle_id = image.vehicle_id, "image attached");
        Ok(image)
    }

    pub async fn update_image(&self, id: u32, req: UpdateImageRequest) -> Result<VehicleImage> {
        req.validate()?;

        let image = self
            .repo
            .update_image(id, req.into_patch())
            .await?
            .ok_or(AppError::NotFound { entity: IMAGE, id })?;
        invalidate(&self.cache, Namespace::Vehicles).await;

        info!(id, "image updated");
        Ok(image)
    }

    pub async fn delete_image(&self, id: u32) -> Result<()> {
        if !self.repo.delete_image(id).await? {
            return Err(AppError::NotFound { entity: IMAGE, id });
        }
        invalidate(&self.cache, Namespace::Vehicles).await;

        info!(id, "image deleted");
        Ok(())
    }

    async fn invalidate_lookups(&self) {
        invalidate(&self.cache, Namespace::Lookups).await;
        invalidate(&self.cache, Namespace::Vehicles).await;
    }
}
