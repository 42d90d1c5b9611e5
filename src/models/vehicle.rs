//! Vehicle domain records
//!
//! Rows as the repository stores them, and the joined shape returned to
//! clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Lookup Kind ==
/// Attribute tables a vehicle can reference.
///
/// Brands, colors and categories are single-valued columns on the vehicle;
/// optionals are a many-to-many set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Brands,
    Colors,
    Categories,
    Optionals,
}

impl LookupKind {
    pub const ALL: [LookupKind; 4] = [
        LookupKind::Brands,
        LookupKind::Colors,
        LookupKind::Categories,
        LookupKind::Optionals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Brands => "brands",
            LookupKind::Colors => "colors",
            LookupKind::Categories => "categories",
            LookupKind::Optionals => "optionals",
        }
    }

    /// Singular entity name used in error messages.
    pub fn entity(&self) -> &'static str {
        match self {
            LookupKind::Brands => "Brand",
            LookupKind::Colors => "Color",
            LookupKind::Categories => "Category",
            LookupKind::Optionals => "Optional",
        }
    }

    /// Name of the vehicle field pointing at this table.
    pub fn foreign_key(&self) -> &'static str {
        match self {
            LookupKind::Brands => "brand_id",
            LookupKind::Colors => "color_id",
            LookupKind::Categories => "category_id",
            LookupKind::Optionals => "optionals",
        }
    }

    /// The id(s) `vehicle` holds into this table.
    pub fn referenced_by(&self, vehicle: &Vehicle) -> Vec<u32> {
        match self {
            LookupKind::Brands => vehicle.brand_id.into_iter().collect(),
            LookupKind::Colors => vehicle.color_id.into_iter().collect(),
            LookupKind::Categories => vehicle.category_id.into_iter().collect(),
            LookupKind::Optionals => vehicle.optional_ids.clone(),
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A brand, color, category or optional row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub id: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == Vehicle ==
/// A vehicle row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    pub model: String,
    pub price: f64,
    pub description: Option<String>,
    pub mileage: u32,
    pub fuel_type: String,
    pub transmission: String,
    pub image_url: Option<String>,
    pub available: bool,
    pub year: Option<u16>,
    pub brand_id: Option<u32>,
    pub color_id: Option<u32>,
    pub category_id: Option<u32>,
    /// Sorted, deduplicated optional ids; clients see the joined rows.
    #[serde(skip)]
    pub optional_ids: Vec<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when inserting a vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVehicle {
    pub model: String,
    pub price: f64,
    pub description: Option<String>,
    pub mileage: u32,
    pub fuel_type: String,
    pub transmission: String,
    pub image_url: Option<String>,
    pub available: bool,
    pub year: Option<u16>,
    pub brand_id: Option<u32>,
    pub color_id: Option<u32>,
    pub category_id: Option<u32>,
    pub optional_ids: Vec<u32>,
}

/// Partial update; `None` leaves the column unchanged.
///
/// Nullable columns take `Some(None)` to clear them. `optional_ids`
/// replaces the whole set when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePatch {
    pub model: Option<String>,
    pub price: Option<f64>,
    pub description: Option<Option<String>>,
    pub mileage: Option<u32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub image_url: Option<Option<String>>,
    pub available: Option<bool>,
    pub year: Option<Option<u16>>,
    pub brand_id: Option<Option<u32>>,
    pub color_id: Option<Option<u32>>,
    pub category_id: Option<Option<u32>>,
    pub optional_ids: Option<Vec<u32>>,
}

impl VehiclePatch {
    /// Applies the supplied fields to `vehicle`.
    pub fn apply(self, vehicle: &mut Vehicle) {
        if let Some(model) = self.model {
            vehicle.model = model;
        }
        if let Some(price) = self.price {
            vehicle.price = price;
        }
        if let Some(description) = self.description {
            vehicle.description = description;
        }
        if let Some(mileage) = self.mileage {
            vehicle.mileage = mileage;
        }
        if let Some(fuel_type) = self.fuel_type {
            vehicle.fuel_type = fuel_type;
        }
        if let Some(transmission) = self.transmission {
            vehicle.transmission = transmission;
        }
        if let Some(image_url) = self.image_url {
            vehicle.image_url = image_url;
        }
        if let Some(available) = self.available {
            vehicle.available = available;
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        if let Some(brand_id) = self.brand_id {
            vehicle.brand_id = brand_id;
        }
        if let Some(color_id) = self.color_id {
            vehicle.color_id = color_id;
        }
        if let Some(category_id) = self.category_id {
            vehicle.category_id = category_id;
        }
        if let Some(optional_ids) = self.optional_ids {
            vehicle.optional_ids = normalize_ids(optional_ids);
        }
    }
}

/// Sorts and deduplicates a list of ids.
pub fn normalize_ids(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

// == Images ==
/// A gallery image attached to a vehicle. Galleries are ordered by
/// `position`, then id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleImage {
    pub id: u32,
    pub vehicle_id: u32,
    pub url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when attaching an image.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub vehicle_id: u32,
    pub url: String,
    pub position: i32,
}

/// Partial image update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePatch {
    pub url: Option<String>,
    pub position: Option<i32>,
}

impl ImagePatch {
    pub fn apply(self, image: &mut VehicleImage) {
        if let Some(url) = self.url {
            image.url = url;
        }
        if let Some(position) = self.position {
            image.position = position;
        }
    }
}

/// A vehicle joined with its lookups and image gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetails {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub brand: Option<Lookup>,
    pub color: Option<Lookup>,
    pub category: Option<Lookup>,
    pub optionals: Vec<Lookup>,
    pub images: Vec<VehicleImage>,
}

// == Search ==
/// Column filters for a vehicle search. Price bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFilter {
    pub brand_id: Option<u32>,
    pub color_id: Option<u32>,
    pub category_id: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        let id_matches = |wanted: Option<u32>, actual: Option<u32>| {
            wanted.map_or(true, |id| actual == Some(id))
        };

        id_matches(self.brand_id, vehicle.brand_id)
            && id_matches(self.color_id, vehicle.color_id)
            && id_matches(self.category_id, vehicle.category_id)
            && self.min_price.map_or(true, |min| vehicle.price >= min)
            && self.max_price.map_or(true, |max| vehicle.price <= max)
    }
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}
