//! In-memory store
//!
//! Used by tests and local development. Enforces the same invariants as the
//! PostgreSQL backend: unique manufacturer names, unique driver usernames
//! and license numbers, required car→manufacturer references, and blocked
//! manufacturer deletion while cars reference it. A single `RwLock` over all
//! tables serializes writers, so a toggle is atomic here the same way a
//! database transaction makes it atomic in production.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use fleet_core::{Car, Driver, Manufacturer, SearchTerm};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    Assignment, CarChanges, CarStore, DriverStore, ListQuery, ManufacturerChanges,
    ManufacturerStore, NewCar, NewDriver, NewManufacturer,
};

#[derive(Debug, Default)]
struct Tables {
    manufacturers: HashMap<Uuid, Manufacturer>,
    drivers: HashMap<Uuid, Driver>,
    cars: HashMap<Uuid, Car>,
    /// (car_id, driver_id) pairs
    assignments: HashSet<(Uuid, Uuid)>,
}

/// In-memory implementation of the fleet store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(mut rows: Vec<T>, query: &ListQuery) -> Vec<T> {
    let offset = query.offset() as usize;
    if offset >= rows.len() {
        return Vec::new();
    }
    rows.drain(..offset);
    rows.truncate(query.limit() as usize);
    rows
}

impl Tables {
    fn check_manufacturer_name(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<()> {
        let taken = self
            .manufacturers
            .values()
            .any(|m| m.name == name && Some(m.id) != exclude);
        if taken {
            return Err(StoreError::unique_violation("manufacturers_name_key"));
        }
        Ok(())
    }

    fn check_driver_username(&self, username: &str, exclude: Option<Uuid>) -> StoreResult<()> {
        let taken = self
            .drivers
            .values()
            .any(|d| d.username == username && Some(d.id) != exclude);
        if taken {
            return Err(StoreError::unique_violation("drivers_username_key"));
        }
        Ok(())
    }

    fn check_license_number(&self, license_number: &str, exclude: Option<Uuid>) -> StoreResult<()> {
        let taken = self
            .drivers
            .values()
            .any(|d| d.license_number == license_number && Some(d.id) != exclude);
        if taken {
            return Err(StoreError::unique_violation("drivers_license_number_key"));
        }
        Ok(())
    }

    fn check_car_references(&self, manufacturer_id: Uuid, drivers: &[Uuid]) -> StoreResult<()> {
        if !self.manufacturers.contains_key(&manufacturer_id) {
            return Err(StoreError::foreign_key_violation("cars_manufacturer_id_fkey"));
        }
        for driver_id in drivers {
            if !self.drivers.contains_key(driver_id) {
                return Err(StoreError::foreign_key_violation("car_drivers_driver_id_fkey"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ManufacturerStore for MemoryStore {
    async fn list_manufacturers(&self, query: &ListQuery) -> StoreResult<Vec<Manufacturer>> {
        let tables = self.tables.read().unwrap();
        let mut rows: Vec<Manufacturer> = tables
            .manufacturers
            .values()
            .filter(|m| query.search.matches(&m.name))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(rows, query))
    }

    async fn count_manufacturers(&self, search: &SearchTerm) -> StoreResult<u64> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .manufacturers
            .values()
            .filter(|m| search.matches(&m.name))
            .count() as u64)
    }

    async fn find_manufacturer(&self, id: Uuid) -> StoreResult<Manufacturer> {
        self.tables
            .read()
            .unwrap()
            .manufacturers
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("manufacturer"))
    }

    async fn create_manufacturer(&self, new: NewManufacturer) -> StoreResult<Manufacturer> {
        let mut tables = self.tables.write().unwrap();
        tables.check_manufacturer_name(&new.name, None)?;
        let manufacturer = Manufacturer {
            id: Uuid::new_v4(),
            name: new.name,
            country: new.country,
        };
        tables.manufacturers.insert(manufacturer.id, manufacturer.clone());
        Ok(manufacturer)
    }

    async fn update_manufacturer(
        &self,
        id: Uuid,
        changes: ManufacturerChanges,
    ) -> StoreResult<Manufacturer> {
        let mut tables = self.tables.write().unwrap();
        if !tables.manufacturers.contains_key(&id) {
            return Err(StoreError::not_found("manufacturer"));
        }
        tables.check_manufacturer_name(&changes.name, Some(id))?;
        let manufacturer = tables.manufacturers.get_mut(&id).unwrap();
        manufacturer.name = changes.name;
        manufacturer.country = changes.country;
        Ok(manufacturer.clone())
    }

    async fn delete_manufacturer(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().unwrap();
        if !tables.manufacturers.contains_key(&id) {
            return Err(StoreError::not_found("manufacturer"));
        }
        if tables.cars.values().any(|car| car.manufacturer_id == id) {
            return Err(StoreError::foreign_key_violation("cars_manufacturer_id_fkey"));
        }
        tables.manufacturers.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl DriverStore for MemoryStore {
    async fn list_drivers(&self, query: &ListQuery) -> StoreResult<Vec<Driver>> {
        let tables = self.tables.read().unwrap();
        let mut rows: Vec<Driver> = tables
            .drivers
            .values()
            .filter(|d| query.search.matches(&d.username))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(rows, query))
    }

    async fn count_drivers(&self, search: &SearchTerm) -> StoreResult<u64> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .drivers
            .values()
            .filter(|d| search.matches(&d.username))
            .count() as u64)
    }

    async fn find_driver(&self, id: Uuid) -> StoreResult<Driver> {
        self.tables
            .read()
            .unwrap()
            .drivers
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("driver"))
    }

    async fn find_driver_by_username(&self, username: &str) -> StoreResult<Driver> {
        self.tables
            .read()
            .unwrap()
            .drivers
            .values()
            .find(|d| d.username == username)
            .cloned()
            .ok_or(StoreError::not_found("driver"))
    }

    async fn create_driver(&self, new: NewDriver) -> StoreResult<Driver> {
        let mut tables = self.tables.write().unwrap();
        tables.check_driver_username(&new.username, None)?;
        tables.check_license_number(&new.license_number, None)?;
        let driver = Driver {
            id: Uuid::new_v4(),
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            license_number: new.license_number,
            password_hash: new.password_hash,
        };
        tables.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    async fn update_license(&self, id: Uuid, license_number: String) -> StoreResult<Driver> {
        let mut tables = self.tables.write().unwrap();
        if !tables.drivers.contains_key(&id) {
            return Err(StoreError::not_found("driver"));
        }
        tables.check_license_number(&license_number, Some(id))?;
        let driver = tables.drivers.get_mut(&id).unwrap();
        driver.license_number = license_number;
        Ok(driver.clone())
    }

    async fn delete_driver(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().unwrap();
        if tables.drivers.remove(&id).is_none() {
            return Err(StoreError::not_found("driver"));
        }
        tables.assignments.retain(|(_, driver_id)| *driver_id != id);
        Ok(())
    }

    async fn cars_for_driver(&self, id: Uuid) -> StoreResult<Vec<Car>> {
        let tables = self.tables.read().unwrap();
        if !tables.drivers.contains_key(&id) {
            return Err(StoreError::not_found("driver"));
        }
        let mut cars: Vec<Car> = tables
            .assignments
            .iter()
            .filter(|(_, driver_id)| *driver_id == id)
            .filter_map(|(car_id, _)| tables.cars.get(car_id).cloned())
            .collect();
        cars.sort_by(|a, b| a.model.cmp(&b.model));
        Ok(cars)
    }
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn list_cars(&self, query: &ListQuery) -> StoreResult<Vec<Car>> {
        let tables = self.tables.read().unwrap();
        let mut rows: Vec<Car> = tables
            .cars
            .values()
            .filter(|car| query.search.matches(&car.model))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.model.cmp(&b.model));
        Ok(paginate(rows, query))
    }

    async fn count_cars(&self, search: &SearchTerm) -> StoreResult<u64> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .cars
            .values()
            .filter(|car| search.matches(&car.model))
            .count() as u64)
    }

    async fn find_car(&self, id: Uuid) -> StoreResult<Car> {
        self.tables
            .read()
            .unwrap()
            .cars
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("car"))
    }

    async fn create_car(&self, new: NewCar) -> StoreResult<Car> {
        let mut tables = self.tables.write().unwrap();
        tables.check_car_references(new.manufacturer_id, &new.drivers)?;
        let car = Car {
            id: Uuid::new_v4(),
            model: new.model,
            manufacturer_id: new.manufacturer_id,
        };
        tables.cars.insert(car.id, car.clone());
        for driver_id in new.drivers {
            tables.assignments.insert((car.id, driver_id));
        }
        Ok(car)
    }

    async fn update_car(&self, id: Uuid, changes: CarChanges) -> StoreResult<Car> {
        let mut tables = self.tables.write().unwrap();
        if !tables.cars.contains_key(&id) {
            return Err(StoreError::not_found("car"));
        }
        tables.check_car_references(changes.manufacturer_id, &changes.drivers)?;
        let car = tables.cars.get_mut(&id).unwrap();
        car.model = changes.model;
        car.manufacturer_id = changes.manufacturer_id;
        let car = car.clone();
        tables.assignments.retain(|(car_id, _)| *car_id != id);
        for driver_id in changes.drivers {
            tables.assignments.insert((id, driver_id));
        }
        Ok(car)
    }

    async fn delete_car(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().unwrap();
        if tables.cars.remove(&id).is_none() {
            return Err(StoreError::not_found("car"));
        }
        tables.assignments.retain(|(car_id, _)| *car_id != id);
        Ok(())
    }

    async fn drivers_for_car(&self, id: Uuid) -> StoreResult<Vec<Driver>> {
        let tables = self.tables.read().unwrap();
        if !tables.cars.contains_key(&id) {
            return Err(StoreError::not_found("car"));
        }
        let mut drivers: Vec<Driver> = tables
            .assignments
            .iter()
            .filter(|(car_id, _)| *car_id == id)
            .filter_map(|(_, driver_id)| tables.drivers.get(driver_id).cloned())
            .collect();
        drivers.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(drivers)
    }

    async fn toggle_assignment(&self, driver_id: Uuid, car_id: Uuid) -> StoreResult<Assignment> {
        let mut tables = self.tables.write().unwrap();
        if !tables.drivers.contains_key(&driver_id) {
            return Err(StoreError::not_found("driver"));
        }
        if !tables.cars.contains_key(&car_id) {
            return Err(StoreError::not_found("car"));
        }
        let key = (car_id, driver_id);
        if tables.assignments.remove(&key) {
            Ok(Assignment::Removed)
        } else {
            tables.assignments.insert(key);
            Ok(Assignment::Added)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::SearchTerm;

    async fn manufacturer(store: &MemoryStore, name: &str, country: &str) -> Manufacturer {
        store
            .create_manufacturer(NewManufacturer {
                name: name.to_string(),
                country: country.to_string(),
            })
            .await
            .unwrap()
    }

    async fn driver(store: &MemoryStore, username: &str, license_number: &str) -> Driver {
        store
            .create_driver(NewDriver {
                username: username.to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                license_number: license_number.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    async fn car(store: &MemoryStore, model: &str, manufacturer_id: Uuid) -> Car {
        store
            .create_car(NewCar {
                model: model.to_string(),
                manufacturer_id,
                drivers: Vec::new(),
            })
            .await
            .unwrap()
    }

    fn search(term: &str) -> ListQuery {
        ListQuery::new(SearchTerm::new(term))
    }

    #[tokio::test]
    async fn manufacturer_name_must_be_unique() {
        let store = MemoryStore::new();
        manufacturer(&store, "Toyota", "Japan").await;

        let err = store
            .create_manufacturer(NewManufacturer {
                name: "Toyota".to_string(),
                country: "USA".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn manufacturer_update_keeps_own_name_but_rejects_taken_one() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        manufacturer(&store, "Ford", "USA").await;

        // Re-saving under its own name is fine.
        let updated = store
            .update_manufacturer(
                toyota.id,
                ManufacturerChanges {
                    name: "Toyota".to_string(),
                    country: "Japan".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.country, "Japan");

        let err = store
            .update_manufacturer(
                toyota.id,
                ManufacturerChanges {
                    name: "Ford".to_string(),
                    country: "Japan".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn license_number_must_be_unique() {
        let store = MemoryStore::new();
        driver(&store, "driver1", "ABC12345").await;

        let err = store
            .create_driver(NewDriver {
                username: "driver2".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
                license_number: "ABC12345".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn username_must_be_unique() {
        let store = MemoryStore::new();
        driver(&store, "driver1", "ABC12345").await;

        let err = store
            .create_driver(NewDriver {
                username: "driver1".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
                license_number: "DEF67890".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn car_requires_existing_manufacturer() {
        let store = MemoryStore::new();
        let err = store
            .create_car(NewCar {
                model: "Camry".to_string(),
                manufacturer_id: Uuid::new_v4(),
                drivers: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn manufacturer_deletion_is_blocked_by_referencing_cars() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        let camry = car(&store, "Camry", toyota.id).await;

        let err = store.delete_manufacturer(toyota.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));

        store.delete_car(camry.id).await.unwrap();
        store.delete_manufacturer(toyota.id).await.unwrap();
        assert_eq!(
            store.count_manufacturers(&SearchTerm::default()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn manufacturer_search_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        manufacturer(&store, "Toyota", "Japan").await;
        manufacturer(&store, "Ford", "USA").await;
        manufacturer(&store, "Tesla", "USA").await;

        let all = store.list_manufacturers(&ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let hits = store.list_manufacturers(&search("T")).await.unwrap();
        let names: Vec<_> = hits.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Tesla", "Toyota"]);

        assert!(store.list_manufacturers(&search("Honda")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn car_search_matches_model_substring() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        for model in ["Camry", "Corolla", "Civic"] {
            car(&store, model, toyota.id).await;
        }

        assert_eq!(store.list_cars(&search("C")).await.unwrap().len(), 3);
        let exact = store.list_cars(&search("Camry")).await.unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].model, "Camry");
    }

    #[tokio::test]
    async fn driver_search_matches_username_substring() {
        let store = MemoryStore::new();
        driver(&store, "driver1", "ABC12345").await;
        driver(&store, "driver2", "DEF67890").await;
        driver(&store, "driver3", "GHI13579").await;
        driver(&store, "testuser", "JKL24680").await;

        let hits = store.list_drivers(&search("driver")).await.unwrap();
        let usernames: Vec<_> = hits.iter().map(|d| d.username.as_str()).collect();
        assert_eq!(usernames, vec!["driver1", "driver2", "driver3"]);

        assert!(store.list_drivers(&search("nonexistent")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_paginate_in_default_order() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        for model in ["Avalon", "Camry", "Corolla", "Highlander", "Prius"] {
            car(&store, model, toyota.id).await;
        }

        let page1 = store
            .list_cars(&ListQuery::default().page(1).per_page(2))
            .await
            .unwrap();
        let page2 = store
            .list_cars(&ListQuery::default().page(2).per_page(2))
            .await
            .unwrap();
        let page3 = store
            .list_cars(&ListQuery::default().page(3).per_page(2))
            .await
            .unwrap();
        let models: Vec<_> = page1
            .iter()
            .chain(&page2)
            .chain(&page3)
            .map(|c| c.model.as_str())
            .collect();
        assert_eq!(models, vec!["Avalon", "Camry", "Corolla", "Highlander", "Prius"]);

        let past_end = store
            .list_cars(&ListQuery::default().page(4).per_page(2))
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_restores_original_state() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        let camry = car(&store, "Camry", toyota.id).await;
        let john = driver(&store, "driver1", "ABC12345").await;

        assert_eq!(
            store.toggle_assignment(john.id, camry.id).await.unwrap(),
            Assignment::Added
        );
        assert_eq!(store.cars_for_driver(john.id).await.unwrap(), vec![camry.clone()]);
        assert_eq!(store.drivers_for_car(camry.id).await.unwrap().len(), 1);

        assert_eq!(
            store.toggle_assignment(john.id, camry.id).await.unwrap(),
            Assignment::Removed
        );
        assert!(store.cars_for_driver(john.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_requires_existing_rows() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        let camry = car(&store, "Camry", toyota.id).await;

        let err = store.toggle_assignment(Uuid::new_v4(), camry.id).await.unwrap_err();
        assert_eq!(err, StoreError::not_found("driver"));
    }

    #[tokio::test]
    async fn car_update_replaces_driver_set() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        let honda = manufacturer(&store, "Honda", "Japan").await;
        let d1 = driver(&store, "driver1", "ABC12345").await;
        let d2 = driver(&store, "driver2", "DEF67890").await;

        let civic = store
            .create_car(NewCar {
                model: "Civic".to_string(),
                manufacturer_id: honda.id,
                drivers: vec![d1.id],
            })
            .await
            .unwrap();
        assert_eq!(store.drivers_for_car(civic.id).await.unwrap(), vec![d1.clone()]);

        let updated = store
            .update_car(
                civic.id,
                CarChanges {
                    model: "Civic Type R".to_string(),
                    manufacturer_id: toyota.id,
                    drivers: vec![d2.id],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.model, "Civic Type R");
        assert_eq!(updated.manufacturer_id, toyota.id);
        assert_eq!(store.drivers_for_car(civic.id).await.unwrap(), vec![d2.clone()]);
    }

    #[tokio::test]
    async fn deleting_a_driver_cleans_up_assignments() {
        let store = MemoryStore::new();
        let toyota = manufacturer(&store, "Toyota", "Japan").await;
        let camry = car(&store, "Camry", toyota.id).await;
        let john = driver(&store, "driver1", "ABC12345").await;
        store.toggle_assignment(john.id, camry.id).await.unwrap();

        store.delete_driver(john.id).await.unwrap();
        assert!(store.drivers_for_car(camry.id).await.unwrap().is_empty());
        assert_eq!(
            store.find_driver(john.id).await.unwrap_err(),
            StoreError::not_found("driver")
        );
    }

    #[tokio::test]
    async fn find_driver_by_username_and_missing_rows() {
        let store = MemoryStore::new();
        let john = driver(&store, "driver1", "ABC12345").await;

        assert_eq!(
            store.find_driver_by_username("driver1").await.unwrap().id,
            john.id
        );
        assert_eq!(
            store.find_driver_by_username("ghost").await.unwrap_err(),
            StoreError::not_found("driver")
        );
        assert_eq!(
            store.find_car(Uuid::new_v4()).await.unwrap_err(),
            StoreError::not_found("car")
        );
    }
}
