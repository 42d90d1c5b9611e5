//! Domain records and request/response models
//!
//! `vehicle` holds the rows the repository stores; `requests` and
//! `responses` are the HTTP DTOs.

pub mod requests;
pub mod responses;
pub mod vehicle;

// Re-export commonly used types
pub use requests::{
    CreateImageRequest, CreateLookupRequest, CreateVehicleRequest, UpdateImageRequest,
    UpdateVehicleRequest, VehicleSearchQuery,
};
pub use responses::{FlushResponse, HealthResponse, SearchPage, StatsResponse};
pub use vehicle::{
    normalize_ids, ImagePatch, Lookup, LookupKind, NewImage, NewVehicle, PageRequest, Vehicle,
    VehicleDetails, VehicleFilter, VehicleImage, VehiclePatch,
};
