//! In-memory repository
//!
//! Tables live in `BTreeMap`s behind one `RwLock`, so a write and its
//! constraint checks happen atomically.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    ImagePatch, Lookup, LookupKind, NewImage, NewVehicle, PageRequest, Vehicle, VehicleDetails,
    VehicleFilter, VehicleImage, VehiclePatch,
};
use crate::repository::{RepoResult, RepositoryError, VehicleRepository};

#[derive(Debug, Default)]
struct Tables {
    vehicles: BTreeMap<u32, Vehicle>,
    brands: BTreeMap<u32, Lookup>,
    colors: BTreeMap<u32, Lookup>,
    categories: BTreeMap<u32, Lookup>,
    optionals: BTreeMap<u32, Lookup>,
    images: BTreeMap<u32, VehicleImage>,
    next_vehicle_id: u32,
    next_lookup_id: u32,
    next_image_id: u32,
}

impl Tables {
    fn lookups(&self, kind: LookupKind) -> &BTreeMap<u32, Lookup> {
        match kind {
            LookupKind::Brands => &self.brands,
            LookupKind::Colors => &self.colors,
            LookupKind::Categories => &self.categories,
            LookupKind::Optionals => &self.optionals,
        }
    }

    fn lookups_mut(&mut self, kind: LookupKind) -> &mut BTreeMap<u32, Lookup> {
        match kind {
            LookupKind::Brands => &mut self.brands,
            LookupKind::Colors => &mut self.colors,
            LookupKind::Categories => &mut self.categories,
            LookupKind::Optionals => &mut self.optionals,
        }
    }

    fn check_references(&self, vehicle: &Vehicle) -> RepoResult<()> {
        for kind in LookupKind::ALL {
            let table = self.lookups(kind);
            if let Some(id) = kind
                .referenced_by(vehicle)
                .into_iter()
                .find(|id| !table.contains_key(id))
            {
                return Err(RepositoryError::ForeignKey {
                    field: kind.foreign_key(),
                    id,
                });
            }
        }
        Ok(())
    }

    fn is_referenced(&self, kind: LookupKind, id: u32) -> bool {
        self.vehicles
            .values()
            .any(|v| kind.referenced_by(v).contains(&id))
    }

    /// Images of one vehicle ordered by position, then id.
    fn gallery(&self, vehicle_id: u32) -> Vec<VehicleImage> {
        let mut images: Vec<VehicleImage> = self
            .images
            .values()
            .filter(|img| img.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        images.sort_by_key(|img| (img.position, img.id));
        images
    }

    fn join(&self, vehicle: &Vehicle) -> VehicleDetails {
        let fetch = |kind: LookupKind, id: Option<u32>| {
            id.and_then(|id| self.lookups(kind).get(&id).cloned())
        };

        VehicleDetails {
            brand: fetch(LookupKind::Brands, vehicle.brand_id),
            color: fetch(LookupKind::Colors, vehicle.color_id),
            category: fetch(LookupKind::Categories, vehicle.category_id),
            optionals: vehicle
                .optional_ids
                .iter()
                .filter_map(|id| self.optionals.get(id).cloned())
                .collect(),
            images: self.gallery(vehicle.id),
            vehicle: vehicle.clone(),
        }
    }

    /// Vehicles matching `filter`, ordered by model then id.
    fn sorted(&self, filter: &VehicleFilter) -> Vec<&Vehicle> {
        let mut rows: Vec<&Vehicle> = self.vehicles.values().filter(|v| filter.matches(v)).collect();
        rows.sort_by(|a, b| a.model.cmp(&b.model).then(a.id.cmp(&b.id)));
        rows
    }
}

// == In-Memory Repository ==
/// Process-local [`VehicleRepository`].
#[derive(Debug, Default)]
pub struct InMemoryVehicleRepository {
    tables: RwLock<Tables>,
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn list(&self) -> RepoResult<Vec<VehicleDetails>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sorted(&VehicleFilter::default())
            .into_iter()
            .map(|v| tables.join(v))
            .collect())
    }

    async fn search(
        &self,
        filter: &VehicleFilter,
        page: PageRequest,
    ) -> RepoResult<(usize, Vec<VehicleDetails>)> {
        let tables = self.tables.read().await;
        let rows = tables.sorted(filter);
        let total = rows.len();
        let vehicles = rows
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .map(|v| tables.join(v))
            .collect();
        Ok((total, vehicles))
    }

    async fn find(&self, id: u32) -> RepoResult<Option<VehicleDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.vehicles.get(&id).map(|v| tables.join(v)))
    }

    async fn insert(&self, new: NewVehicle) -> RepoResult<VehicleDetails> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let vehicle = Vehicle {
            id: tables.next_vehicle_id + 1,
            model: new.model,
            price: new.price,
            description: new.description,
            mileage: new.mileage,
            fuel_type: new.fuel_type,
            transmission: new.transmission,
            image_url: new.image_url,
            available: new.available,
            year: new.year,
            brand_id: new.brand_id,
            color_id: new.color_id,
            category_id: new.category_id,
            optional_ids: new.optional_ids,
            created_at: now,
            updated_at: now,
        };
        tables.check_references(&vehicle)?;

        tables.next_vehicle_id = vehicle.id;
        let details = tables.join(&vehicle);
        tables.vehicles.insert(vehicle.id, vehicle);
        Ok(details)
    }

    async fn update(&self, id: u32, patch: VehiclePatch) -> RepoResult<Option<VehicleDetails>> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.vehicles.get(&id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        patch.apply(&mut updated);
        updated.updated_at = Utc::now();
        tables.check_references(&updated)?;

        let details = tables.join(&updated);
        tables.vehicles.insert(id, updated);
        Ok(Some(details))
    }

    async fn delete(&self, id: u32) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.vehicles.remove(&id).is_none() {
            return Ok(false);
        }
        tables.images.retain(|_, img| img.vehicle_id != id);
        Ok(true)
    }

    async fn list_lookups(&self, kind: LookupKind) -> RepoResult<Vec<Lookup>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Lookup> = tables.lookups(kind).values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert_lookup(&self, kind: LookupKind, name: String) -> RepoResult<Lookup> {
        let mut tables = self.tables.write().await;
        tables.next_lookup_id += 1;
        let now = Utc::now();
        let lookup = Lookup {
            id: tables.next_lookup_id,
            name,
            created_at: now,
            updated_at: now,
        };
        tables.lookups_mut(kind).insert(lookup.id, lookup.clone());
        Ok(lookup)
    }

    async fn delete_lookup(&self, kind: LookupKind, id: u32) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.lookups(kind).contains_key(&id) {
            return Ok(false);
        }
        if tables.is_referenced(kind, id) {
            return Err(RepositoryError::ForeignKey {
                field: kind.foreign_key(),
                id,
            });
        }
        tables.lookups_mut(kind).remove(&id);
        Ok(true)
    }

    async fn list_images(&self, vehicle_id: u32) -> RepoResult<Option<Vec<VehicleImage>>> {
        let tables = self.tables.read().await;
        if !tables.vehicles.contains_key(&vehicle_id) {
            return Ok(None);
        }
        Ok(Some(tables.gallery(vehicle_id)))
    }

    async fn find_image(&self, id: u32) -> RepoResult<Option<VehicleImage>> {
        Ok(self.tables.read().await.images.get(&id).cloned())
    }

    async fn insert_image(&self, new: NewImage) -> RepoResult<VehicleImage> {
        let mut tables = self.tables.write().await;
        if !tables.vehicles.contains_key(&new.vehicle_id) {
            return Err(RepositoryError::ForeignKey {
                field: "vehicle_id",
                id: new.vehicle_id,
            });
        }

        tables.next_image_id += 1;
        let now = Utc::now();
        let image = VehicleImage {
            id: tables.next_image_id,
            vehicle_id: new.vehicle_id,
            url: new.url,
            position: new.position,
            created_at: now,
            updated_at: now,
        };
        tables.images.insert(image.id, image.clone());
        Ok(image)
    }

    async fn update_image(&self, id: u32, patch: ImagePatch) -> RepoResult<Option<VehicleImage>> {
        let mut tables = self.tables.write().await;
        let Some(image) = tables.images.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(image);
        image.updated_at = Utc::now();
        Ok(Some(image.clone()))
    }

    async fn delete_image(&self, id: u32) -> RepoResult<bool> {
        Ok(self.tables.write().await.images.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_vehicle(model: &str, price: f64) -> NewVehicle {
        NewVehicle {
            model: model.to_string(),
            price,
            mileage: 1_000,
            fuel_type: "flex".to_string(),
            transmission: "manual".to_string(),
            available: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryVehicleRepository::new();
        let a = repo.insert(new_vehicle("Uno", 30_000.0)).await.unwrap();
        let b = repo.insert(new_vehicle("Gol", 35_000.0)).await.unwrap();

        assert_eq!(a.vehicle.id, 1);
        assert_eq!(b.vehicle.id, 2);
    }

    #[tokio::test]
    async fn test_list_orders_by_model() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert(new_vehicle("Uno", 30_000.0)).await.unwrap();
        repo.insert(new_vehicle("Civic", 90_000.0)).await.unwrap();
        repo.insert(new_vehicle("Gol", 35_000.0)).await.unwrap();

        let models: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.vehicle.model)
            .collect();
        assert_eq!(models, vec!["Civic", "Gol", "Uno"]);
    }

    #[tokio::test]
    async fn test_insert_joins_lookups() {
        let repo = InMemoryVehicleRepository::new();
        let brand = repo
            .insert_lookup(LookupKind::Brands, "Fiat".into())
            .await
            .unwrap();

        let mut vehicle = new_vehicle("Uno", 30_000.0);
        vehicle.brand_id = Some(brand.id);
        let details = repo.insert(vehicle).await.unwrap();

        assert_eq!(details.brand.map(|b| b.name), Some("Fiat".to_string()));
        assert!(details.color.is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_reference() {
        let repo = InMemoryVehicleRepository::new();
        let mut vehicle = new_vehicle("Uno", 30_000.0);
        vehicle.color_id = Some(42);

        let err = repo.insert(vehicle).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::ForeignKey {
                field: "color_id",
                id: 42
            }
        ));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_filters_and_paginates() {
        let repo = InMemoryVehicleRepository::new();
        for (model, price) in [("A", 10.0), ("B", 20.0), ("C", 30.0), ("D", 40.0)] {
            repo.insert(new_vehicle(model, price)).await.unwrap();
        }

        let filter = VehicleFilter {
            min_price: Some(15.0),
            ..Default::default()
        };
        let (total, page) = repo
            .search(&filter, PageRequest { page: 2, limit: 2 })
            .await
            .unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].vehicle.model, "D");
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = InMemoryVehicleRepository::new();
        let result = repo.update(9, VehiclePatch::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let repo = InMemoryVehicleRepository::new();
        let created = repo.insert(new_vehicle("Uno", 30_000.0)).await.unwrap();

        let updated = repo
            .update(
                created.vehicle.id,
                VehiclePatch {
                    model: Some("Uno Way".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.vehicle.model, "Uno Way");
        assert_eq!(updated.vehicle.price, 30_000.0);
        assert!(updated.vehicle.updated_at >= created.vehicle.updated_at);
    }

    #[tokio::test]
    async fn test_delete_vehicle() {
        let repo = InMemoryVehicleRepository::new();
        let created = repo.insert(new_vehicle("Uno", 30_000.0)).await.unwrap();

        assert!(repo.delete(created.vehicle.id).await.unwrap());
        assert!(!repo.delete(created.vehicle.id).await.unwrap());
        assert!(repo.find(created.vehicle.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_referenced_lookup_fails() {
        let repo = InMemoryVehicleRepository::new();
        let color = repo
            .insert_lookup(LookupKind::Colors, "Preto".into())
            .await
            .unwrap();
        let mut vehicle = new_vehicle("Uno", 30_000.0);
        vehicle.color_id = Some(color.id);
        let created = repo.insert(vehicle).await.unwrap();

        assert!(repo.delete_lookup(LookupKind::Colors, color.id).await.is_err());

        repo.delete(created.vehicle.id).await.unwrap();
        assert!(repo.delete_lookup(LookupKind::Colors, color.id).await.unwrap());
        assert!(!repo.delete_lookup(LookupKind::Colors, color.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_optionals_joined_and_checked() {
        let repo = InMemoryVehicleRepository::new();
        let abs = repo
            .insert_lookup(LookupKind::Optionals, "ABS".into())
            .await
            .unwrap();
        let airbag = repo
            .insert_lookup(LookupKind::Optionals, "Airbag".into())
            .await
            .unwrap();

        let mut vehicle = new_vehicle("Uno", 30_000.0);
        vehicle.optional_ids = vec![abs.id, airbag.id];
        let details = repo.insert(vehicle).await.unwrap();
        let names: Vec<&str> = details.optionals.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["ABS", "Airbag"]);

        let mut unknown = new_vehicle("Gol", 35_000.0);
        unknown.optional_ids = vec![abs.id, 99];
        let err = repo.insert(unknown).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::ForeignKey {
                field: "optionals",
                id: 99
            }
        ));

        assert!(repo.delete_lookup(LookupKind::Optionals, abs.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_optionals() {
        let repo = InMemoryVehicleRepository::new();
        let abs = repo
            .insert_lookup(LookupKind::Optionals, "ABS".into())
            .await
            .unwrap();
        let mut vehicle = new_vehicle("Uno", 30_000.0);
        vehicle.optional_ids = vec![abs.id];
        let created = repo.insert(vehicle).await.unwrap();

        let updated = repo
            .update(
                created.vehicle.id,
                VehiclePatch {
                    optional_ids: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.optionals.is_empty());
        assert!(repo.delete_lookup(LookupKind::Optionals, abs.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_images_ordered_and_cascaded() {
        let repo = InMemoryVehicleRepository::new();
        let created = repo.insert(new_vehicle("Uno", 30_000.0)).await.unwrap();
        let id = created.vehicle.id;

        for (url, position) in [("https://img/b.jpg", 2), ("https://img/a.jpg", 1)] {
            repo.insert_image(NewImage {
                vehicle_id: id,
                url: url.into(),
                position,
            })
            .await
            .unwrap();
        }

        let gallery = repo.list_images(id).await.unwrap().unwrap();
        assert_eq!(gallery[0].url, "https://img/a.jpg");
        assert_eq!(repo.find(id).await.unwrap().unwrap().images, gallery);

        let moved = repo
            .update_image(
                gallery[0].id,
                ImagePatch {
                    position: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.position, 3);
        assert_eq!(repo.list_images(id).await.unwrap().unwrap()[0].url, "https://img/b.jpg");

        repo.delete(id).await.unwrap();
        assert!(repo.list_images(id).await.unwrap().is_none());
        assert!(repo.find_image(moved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_image_requires_vehicle() {
        let repo = InMemoryVehicleRepository::new();
        let err = repo
            .insert_image(NewImage {
                vehicle_id: 5,
                url: "https://img/a.jpg".into(),
                position: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::ForeignKey {
                field: "vehicle_id",
                id: 5
            }
        ));
        assert!(!repo.delete_image(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_lookups_sorted_by_name() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_lookup(LookupKind::Categories, "SUV".into())
            .await
            .unwrap();
        repo.insert_lookup(LookupKind::Categories, "Hatch".into())
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_lookups(LookupKind::Categories)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Hatch", "SUV"]);
    }
}
