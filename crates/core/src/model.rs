//! Domain models
//!
//! Three entities: manufacturers, drivers and cars. A car belongs to exactly
//! one manufacturer and carries a many-to-many relation to drivers; the join
//! rows live in the storage layer. Uniqueness (manufacturer name, driver
//! username and license number) is enforced at write time by the stores.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vehicle maker, unique by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: Uuid,
    pub name: String,
    pub country: String,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

/// A user account eligible to be assigned to cars.
///
/// The license number is exactly 8 characters in the `AAA00000` format
/// checked by `fleet-validation`. The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.username, self.first_name, self.last_name)
    }
}

/// A vehicle record belonging to one manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub model: String,
    pub manufacturer_id: Uuid,
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model)
    }
}
