//! PostgreSQL store
//!
//! sqlx-backed implementation of the fleet store traits. Uniqueness and
//! reference invariants are enforced by the schema (see `migrations/`);
//! SQLSTATE 23505/23503 failures surface as the constraint-violation
//! variants of [`StoreError`]. Substring search compiles to `ILIKE` with
//! `\`, `%` and `_` escaped so the semantics match
//! [`fleet_core::SearchTerm::matches`] exactly.

use async_trait::async_trait;
use fleet_core::{Car, Driver, Manufacturer, SearchTerm};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    Assignment, CarChanges, CarStore, DriverStore, ListQuery, ManufacturerChanges,
    ManufacturerStore, NewCar, NewDriver, NewManufacturer,
};

/// PostgreSQL implementation of the fleet store traits.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| StoreError::Database(err.to_string()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `%term%` with LIKE metacharacters escaped, so user input always matches
/// literally.
fn like_pattern(term: &SearchTerm) -> String {
    let escaped = term
        .as_str()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(sqlx::FromRow)]
struct ManufacturerRow {
    id: Uuid,
    name: String,
    country: String,
}

impl From<ManufacturerRow> for Manufacturer {
    fn from(row: ManufacturerRow) -> Self {
        Manufacturer {
            id: row.id,
            name: row.name,
            country: row.country,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    license_number: String,
    password_hash: String,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Driver {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            license_number: row.license_number,
            password_hash: row.password_hash,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    model: String,
    manufacturer_id: Uuid,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Car {
            id: row.id,
            model: row.model,
            manufacturer_id: row.manufacturer_id,
        }
    }
}

#[async_trait]
impl ManufacturerStore for PostgresStore {
    async fn list_manufacturers(&self, query: &ListQuery) -> StoreResult<Vec<Manufacturer>> {
        let rows = sqlx::query_as::<_, ManufacturerRow>(
            "SELECT id, name, country FROM manufacturers \
             WHERE $1 = '' OR name ILIKE $2 \
             ORDER BY name LIMIT $3 OFFSET $4",
        )
        .bind(query.search.as_str())
        .bind(like_pattern(&query.search))
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_manufacturers(&self, search: &SearchTerm) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM manufacturers WHERE $1 = '' OR name ILIKE $2",
        )
        .bind(search.as_str())
        .bind(like_pattern(search))
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn find_manufacturer(&self, id: Uuid) -> StoreResult<Manufacturer> {
        sqlx::query_as::<_, ManufacturerRow>(
            "SELECT id, name, country FROM manufacturers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or(StoreError::not_found("manufacturer"))
    }

    async fn create_manufacturer(&self, new: NewManufacturer) -> StoreResult<Manufacturer> {
        let row = sqlx::query_as::<_, ManufacturerRow>(
            "INSERT INTO manufacturers (id, name, country) VALUES ($1, $2, $3) \
             RETURNING id, name, country",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.country)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(name = %row.name, "manufacturer created");
        Ok(row.into())
    }

    async fn update_manufacturer(
        &self,
        id: Uuid,
        changes: ManufacturerChanges,
    ) -> StoreResult<Manufacturer> {
        sqlx::query_as::<_, ManufacturerRow>(
            "UPDATE manufacturers SET name = $2, country = $3 WHERE id = $1 \
             RETURNING id, name, country",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.country)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or(StoreError::not_found("manufacturer"))
    }

    async fn delete_manufacturer(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM manufacturers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("manufacturer"));
        }
        Ok(())
    }
}

#[async_trait]
impl DriverStore for PostgresStore {
    async fn list_drivers(&self, query: &ListQuery) -> StoreResult<Vec<Driver>> {
        let rows = sqlx::query_as::<_, DriverRow>(
            "SELECT id, username, first_name, last_name, license_number, password_hash \
             FROM drivers \
             WHERE $1 = '' OR username ILIKE $2 \
             ORDER BY username LIMIT $3 OFFSET $4",
        )
        .bind(query.search.as_str())
        .bind(like_pattern(&query.search))
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_drivers(&self, search: &SearchTerm) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM drivers WHERE $1 = '' OR username ILIKE $2")
                .bind(search.as_str())
                .bind(like_pattern(search))
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn find_driver(&self, id: Uuid) -> StoreResult<Driver> {
        sqlx::query_as::<_, DriverRow>(
            "SELECT id, username, first_name, last_name, license_number, password_hash \
             FROM drivers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or(StoreError::not_found("driver"))
    }

    async fn find_driver_by_username(&self, username: &str) -> StoreResult<Driver> {
        sqlx::query_as::<_, DriverRow>(
            "SELECT id, username, first_name, last_name, license_number, password_hash \
             FROM drivers WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or(StoreError::not_found("driver"))
    }

    async fn create_driver(&self, new: NewDriver) -> StoreResult<Driver> {
        let row = sqlx::query_as::<_, DriverRow>(
            "INSERT INTO drivers (id, username, first_name, last_name, license_number, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, username, first_name, last_name, license_number, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.license_number)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(username = %row.username, "driver created");
        Ok(row.into())
    }

    async fn update_license(&self, id: Uuid, license_number: String) -> StoreResult<Driver> {
        sqlx::query_as::<_, DriverRow>(
            "UPDATE drivers SET license_number = $2 WHERE id = $1 \
             RETURNING id, username, first_name, last_name, license_number, password_hash",
        )
        .bind(id)
        .bind(&license_number)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or(StoreError::not_found("driver"))
    }

    async fn delete_driver(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("driver"));
        }
        Ok(())
    }

    async fn cars_for_driver(&self, id: Uuid) -> StoreResult<Vec<Car>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM drivers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(StoreError::not_found("driver"));
        }

        let rows = sqlx::query_as::<_, CarRow>(
            "SELECT c.id, c.model, c.manufacturer_id FROM cars c \
             JOIN car_drivers cd ON cd.car_id = c.id \
             WHERE cd.driver_id = $1 ORDER BY c.model",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CarStore for PostgresStore {
    async fn list_cars(&self, query: &ListQuery) -> StoreResult<Vec<Car>> {
        let rows = sqlx::query_as::<_, CarRow>(
            "SELECT id, model, manufacturer_id FROM cars \
             WHERE $1 = '' OR model ILIKE $2 \
             ORDER BY model LIMIT $3 OFFSET $4",
        )
        .bind(query.search.as_str())
        .bind(like_pattern(&query.search))
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_cars(&self, search: &SearchTerm) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cars WHERE $1 = '' OR model ILIKE $2")
                .bind(search.as_str())
                .bind(like_pattern(search))
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn find_car(&self, id: Uuid) -> StoreResult<Car> {
        sqlx::query_as::<_, CarRow>("SELECT id, model, manufacturer_id FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Into::into)
            .ok_or(StoreError::not_found("car"))
    }

    async fn create_car(&self, new: NewCar) -> StoreResult<Car> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, CarRow>(
            "INSERT INTO cars (id, model, manufacturer_id) VALUES ($1, $2, $3) \
             RETURNING id, model, manufacturer_id",
        )
        .bind(Uuid::new_v4())
        .bind(&new.model)
        .bind(new.manufacturer_id)
        .fetch_one(&mut *tx)
        .await?;
        for driver_id in &new.drivers {
            sqlx::query("INSERT INTO car_drivers (car_id, driver_id) VALUES ($1, $2)")
                .bind(row.id)
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_car(&self, id: Uuid, changes: CarChanges) -> StoreResult<Car> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, CarRow>(
            "UPDATE cars SET model = $2, manufacturer_id = $3 WHERE id = $1 \
             RETURNING id, model, manufacturer_id",
        )
        .bind(id)
        .bind(&changes.model)
        .bind(changes.manufacturer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::not_found("car"))?;

        // PUT semantics: the driver set is replaced wholesale.
        sqlx::query("DELETE FROM car_drivers WHERE car_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for driver_id in &changes.drivers {
            sqlx::query("INSERT INTO car_drivers (car_id, driver_id) VALUES ($1, $2)")
                .bind(id)
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_car(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("car"));
        }
        Ok(())
    }

    async fn drivers_for_car(&self, id: Uuid) -> StoreResult<Vec<Driver>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cars WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(StoreError::not_found("car"));
        }

        let rows = sqlx::query_as::<_, DriverRow>(
            "SELECT d.id, d.username, d.first_name, d.last_name, d.license_number, d.password_hash \
             FROM drivers d \
             JOIN car_drivers cd ON cd.driver_id = d.id \
             WHERE cd.car_id = $1 ORDER BY d.username",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn toggle_assignment(&self, driver_id: Uuid, car_id: Uuid) -> StoreResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let driver_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM drivers WHERE id = $1)")
                .bind(driver_id)
                .fetch_one(&mut *tx)
                .await?;
        if !driver_exists {
            return Err(StoreError::not_found("driver"));
        }
        let car_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cars WHERE id = $1)")
            .bind(car_id)
            .fetch_one(&mut *tx)
            .await?;
        if !car_exists {
            return Err(StoreError::not_found("car"));
        }

        let removed = sqlx::query("DELETE FROM car_drivers WHERE car_id = $1 AND driver_id = $2")
            .bind(car_id)
            .bind(driver_id)
            .execute(&mut *tx)
            .await?;

        let outcome = if removed.rows_affected() > 0 {
            Assignment::Removed
        } else {
            sqlx::query("INSERT INTO car_drivers (car_id, driver_id) VALUES ($1, $2)")
                .bind(car_id)
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
            Assignment::Added
        };
        tx.commit().await?;

        tracing::debug!(%driver_id, %car_id, ?outcome, "assignment toggled");
        Ok(outcome)
    }
}
