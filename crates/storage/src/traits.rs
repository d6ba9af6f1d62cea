//! Store traits and write payloads
//!
//! One trait per entity plus the umbrella [`FleetStore`] the HTTP layer
//! holds. Listings take a [`ListQuery`] combining the per-entity search term
//! with pagination; each backend applies the entity's default ordering
//! (manufacturers by name, drivers by username, cars by model).

use async_trait::async_trait;
use fleet_core::{Car, Driver, Manufacturer, SearchTerm};
use uuid::Uuid;

use crate::error::StoreResult;

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Search + pagination input for listing operations.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: SearchTerm,
    pub page: u32,
    pub per_page: u32,
}

impl ListQuery {
    pub fn new(search: SearchTerm) -> Self {
        Self {
            search,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(SearchTerm::default())
    }
}

#[derive(Debug, Clone)]
pub struct NewManufacturer {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct ManufacturerChanges {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewCar {
    pub model: String,
    pub manufacturer_id: Uuid,
    pub drivers: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CarChanges {
    pub model: String,
    pub manufacturer_id: Uuid,
    pub drivers: Vec<Uuid>,
}

/// Outcome of a toggle on the driver↔car assignment set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Added,
    Removed,
}

#[async_trait]
pub trait ManufacturerStore: Send + Sync {
    async fn list_manufacturers(&self, query: &ListQuery) -> StoreResult<Vec<Manufacturer>>;
    /// Manufacturers matching `search`; pass an empty term for the total.
    async fn count_manufacturers(&self, search: &SearchTerm) -> StoreResult<u64>;
    async fn find_manufacturer(&self, id: Uuid) -> StoreResult<Manufacturer>;
    async fn create_manufacturer(&self, new: NewManufacturer) -> StoreResult<Manufacturer>;
    async fn update_manufacturer(
        &self,
        id: Uuid,
        changes: ManufacturerChanges,
    ) -> StoreResult<Manufacturer>;
    async fn delete_manufacturer(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait DriverStore: Send + Sync {
    async fn list_drivers(&self, query: &ListQuery) -> StoreResult<Vec<Driver>>;
    /// Drivers matching `search`; pass an empty term for the total.
    async fn count_drivers(&self, search: &SearchTerm) -> StoreResult<u64>;
    async fn find_driver(&self, id: Uuid) -> StoreResult<Driver>;
    async fn find_driver_by_username(&self, username: &str) -> StoreResult<Driver>;
    async fn create_driver(&self, new: NewDriver) -> StoreResult<Driver>;
    async fn update_license(&self, id: Uuid, license_number: String) -> StoreResult<Driver>;
    async fn delete_driver(&self, id: Uuid) -> StoreResult<()>;
    /// Cars currently assigned to the driver, ordered by model.
    async fn cars_for_driver(&self, id: Uuid) -> StoreResult<Vec<Car>>;
}

#[async_trait]
pub trait CarStore: Send + Sync {
    async fn list_cars(&self, query: &ListQuery) -> StoreResult<Vec<Car>>;
    /// Cars matching `search`; pass an empty term for the total.
    async fn count_cars(&self, search: &SearchTerm) -> StoreResult<u64>;
    async fn find_car(&self, id: Uuid) -> StoreResult<Car>;
    async fn create_car(&self, new: NewCar) -> StoreResult<Car>;
    async fn update_car(&self, id: Uuid, changes: CarChanges) -> StoreResult<Car>;
    async fn delete_car(&self, id: Uuid) -> StoreResult<()>;
    /// Drivers currently assigned to the car, ordered by username.
    async fn drivers_for_car(&self, id: Uuid) -> StoreResult<Vec<Driver>>;
    /// Flip membership of `car_id` in the driver's assigned-car set.
    ///
    /// Never fails when both rows exist; two successive calls restore the
    /// original state.
    async fn toggle_assignment(&self, driver_id: Uuid, car_id: Uuid) -> StoreResult<Assignment>;
}

/// The full persistence surface handed to the HTTP layer.
pub trait FleetStore: ManufacturerStore + DriverStore + CarStore {}

impl<T> FleetStore for T where T: ManufacturerStore + DriverStore + CarStore {}
