//! # fleet-storage
//!
//! Repository layer for the fleet management service. The store traits are
//! the only persistence surface the HTTP layer sees; entity invariants
//! (unique manufacturer names, unique driver usernames and license numbers,
//! the required car→manufacturer reference) are enforced here at write time
//! and reported as constraint violations, distinguishable from ordinary
//! validation failures.
//!
//! Two backends: [`MemoryStore`] for tests and development, and
//! [`PostgresStore`] backed by sqlx with embedded migrations.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::{
    Assignment, CarChanges, CarStore, DriverStore, FleetStore, ListQuery, ManufacturerChanges,
    ManufacturerStore, NewCar, NewDriver, NewManufacturer, DEFAULT_PER_PAGE,
};
