//! Repository layer for vehicle data access.
//!
//! The service talks to storage only through [`VehicleRepository`]; the
//! in-memory implementation is what the server runs with.

mod memory;

pub use memory::InMemoryVehicleRepository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ImagePatch, Lookup, LookupKind, NewImage, NewVehicle, PageRequest, VehicleDetails,
    VehicleFilter, VehicleImage, VehiclePatch,
};

// == Repository Error ==
/// Failures reported by a repository. Missing rows are `Ok(None)` /
/// `Ok(false)`, not errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A referenced row does not exist, or a row is still referenced
    #[error("{field} {id} violates a foreign key constraint")]
    ForeignKey { field: &'static str, id: u32 },

    /// Storage could not serve the request
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

// == Vehicle Repository ==
/// Data access for vehicles and their lookup tables.
///
/// Every vehicle read returns [`VehicleDetails`] with its lookups joined.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// All vehicles ordered by model.
    async fn list(&self) -> RepoResult<Vec<VehicleDetails>>;

    /// One page of vehicles matching `filter`, ordered by model, and the
    /// total number of matches.
    async fn search(
        &self,
        filter: &VehicleFilter,
        page: PageRequest,
    ) -> RepoResult<(usize, Vec<VehicleDetails>)>;

    async fn find(&self, id: u32) -> RepoResult<Option<VehicleDetails>>;

    async fn insert(&self, vehicle: NewVehicle) -> RepoResult<VehicleDetails>;

    /// Returns `None` when no vehicle has `id`.
    async fn update(&self, id: u32, patch: VehiclePatch) -> RepoResult<Option<VehicleDetails>>;

    /// Returns whether a vehicle was deleted. Its images and optional
    /// links go with it.
    async fn delete(&self, id: u32) -> RepoResult<bool>;

    /// All rows of a lookup table ordered by name.
    async fn list_lookups(&self, kind: LookupKind) -> RepoResult<Vec<Lookup>>;

    async fn insert_lookup(&self, kind: LookupKind, name: String) -> RepoResult<Lookup>;

    /// Returns whether a row was deleted. Fails while vehicles reference it.
    async fn delete_lookup(&self, kind: LookupKind, id: u32) -> RepoResult<bool>;

    /// A vehicle's gallery ordered by position, or `None` when the vehicle
    /// does not exist.
    async fn list_images(&self, vehicle_id: u32) -> RepoResult<Option<Vec<VehicleImage>>>;

    async fn find_image(&self, id: u32) -> RepoResult<Option<VehicleImage>>;

    /// Fails when the vehicle does not exist.
    async fn insert_image(&self, image: NewImage) -> RepoResult<VehicleImage>;

    async fn update_image(&self, id: u32, patch: ImagePatch) -> RepoResult<Option<VehicleImage>>;

    async fn delete_image(&self, id: u32) -> RepoResult<bool>;
}
