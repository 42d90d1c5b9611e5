//! Service layer.

mod vehicles;

pub use vehicles::VehicleService;
