//! Response view models
//!
//! Entities are serialized with a `display` identity string alongside their
//! fields, so clients render the same labels everywhere ("Toyota Japan",
//! "driver1 (John Doe)"). Detail views embed their related entities; list
//! views stay flat and carry pagination metadata.

use fleet_core::{Car, Driver, Manufacturer};
use fleet_storage::Assignment;
use serde::Serialize;
use uuid::Uuid;

use crate::pagination::PaginationMeta;

/// Envelope for every listing endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct ManufacturerView {
    #[serde(flatten)]
    pub manufacturer: Manufacturer,
    pub display: String,
}

impl From<Manufacturer> for ManufacturerView {
    fn from(manufacturer: Manufacturer) -> Self {
        let display = manufacturer.to_string();
        Self {
            manufacturer,
            display,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DriverView {
    #[serde(flatten)]
    pub driver: Driver,
    pub display: String,
}

impl From<Driver> for DriverView {
    fn from(driver: Driver) -> Self {
        let display = driver.to_string();
        Self { driver, display }
    }
}

#[derive(Debug, Serialize)]
pub struct DriverDetail {
    #[serde(flatten)]
    pub driver: Driver,
    pub display: String,
    pub cars: Vec<CarView>,
}

impl DriverDetail {
    pub fn new(driver: Driver, cars: Vec<Car>) -> Self {
        let display = driver.to_string();
        Self {
            driver,
            display,
            cars: cars.into_iter().map(CarView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CarView {
    #[serde(flatten)]
    pub car: Car,
    pub display: String,
}

impl From<Car> for CarView {
    fn from(car: Car) -> Self {
        let display = car.to_string();
        Self { car, display }
    }
}

#[derive(Debug, Serialize)]
pub struct CarDetail {
    #[serde(flatten)]
    pub car: Car,
    pub display: String,
    pub manufacturer: ManufacturerView,
    pub drivers: Vec<DriverView>,
}

impl CarDetail {
    pub fn new(car: Car, manufacturer: Manufacturer, drivers: Vec<Driver>) -> Self {
        let display = car.to_string();
        Self {
            car,
            display,
            manufacturer: manufacturer.into(),
            drivers: drivers.into_iter().map(DriverView::from).collect(),
        }
    }
}

/// GET / body: entity totals plus the per-session visit counter.
#[derive(Debug, Serialize)]
pub struct HomeSummary {
    pub num_manufacturers: u64,
    pub num_cars: u64,
    pub num_drivers: u64,
    pub num_visits: u64,
}

/// Outcome of a toggle on the car's driver set.
#[derive(Debug, Serialize)]
pub struct AssignmentView {
    pub status: &'static str,
    pub car_id: Uuid,
    pub driver_id: Uuid,
}

impl AssignmentView {
    pub fn new(outcome: Assignment, car_id: Uuid, driver_id: Uuid) -> Self {
        let status = match outcome {
            Assignment::Added => "added",
            Assignment::Removed => "removed",
        };
        Self {
            status,
            car_id,
            driver_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manufacturer() -> Manufacturer {
        Manufacturer {
            id: Uuid::new_v4(),
            name: "Toyota".to_string(),
            country: "Japan".to_string(),
        }
    }

    #[test]
    fn views_carry_display_identities() {
        let view = ManufacturerView::from(manufacturer());
        assert_eq!(view.display, "Toyota Japan");

        let driver = Driver {
            id: Uuid::new_v4(),
            username: "driver1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            license_number: "ABC12345".to_string(),
            password_hash: "secret".to_string(),
        };
        assert_eq!(DriverView::from(driver).display, "driver1 (John Doe)");
    }

    #[test]
    fn car_detail_embeds_relations_without_password_hashes() {
        let manufacturer = manufacturer();
        let car = Car {
            id: Uuid::new_v4(),
            model: "Camry".to_string(),
            manufacturer_id: manufacturer.id,
        };
        let driver = Driver {
            id: Uuid::new_v4(),
            username: "driver1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            license_number: "ABC12345".to_string(),
            password_hash: "secret".to_string(),
        };

        let detail = CarDetail::new(car, manufacturer, vec![driver]);
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["display"], json!("Camry"));
        assert_eq!(value["manufacturer"]["display"], json!("Toyota Japan"));
        assert_eq!(value["drivers"][0]["username"], json!("driver1"));
        assert!(value["drivers"][0].get("password_hash").is_none());
    }

    #[test]
    fn assignment_view_names_the_outcome() {
        let car_id = Uuid::new_v4();
        let driver_id = Uuid::new_v4();
        assert_eq!(
            AssignmentView::new(Assignment::Added, car_id, driver_id).status,
            "added"
        );
        assert_eq!(
            AssignmentView::new(Assignment::Removed, car_id, driver_id).status,
            "removed"
        );
    }
}
