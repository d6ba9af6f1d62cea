//! Request payloads
//!
//! Each mutating endpoint deserializes one of these and validates it before
//! anything touches a store. Validation collects every field failure so the
//! client sees the whole form state at once; uniqueness stays with the
//! storage layer, which reports it as a constraint violation instead.

use async_trait::async_trait;
use fleet_validation::{
    LengthValidator, LicenseNumberValidator, RequiredValidator, ValidatePayload, ValidationErrors,
    ValidationResult, ValidationRule,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[async_trait]
impl ValidatePayload for LoginPayload {
    async fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        let required = RequiredValidator::new();
        for (field, value) in [
            ("username", json!(self.username)),
            ("password", json!(self.password)),
        ] {
            if let Err(failures) = required.validate(&value, field).await {
                errors.merge(failures);
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

#[async_trait]
impl ValidatePayload for ManufacturerPayload {
    async fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        let required = RequiredValidator::new();
        let max_len = LengthValidator::new().max(255);
        for (field, value) in [("name", json!(self.name)), ("country", json!(self.country))] {
            if let Err(failures) = required.validate(&value, field).await {
                errors.merge(failures);
            } else if let Err(failures) = max_len.validate(&value, field).await {
                errors.merge(failures);
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverCreatePayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub license_number: String,
}

#[async_trait]
impl ValidatePayload for DriverCreatePayload {
    async fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        let required = RequiredValidator::new();

        let username = json!(self.username);
        if let Err(failures) = required.validate(&username, "username").await {
            errors.merge(failures);
        } else if let Err(failures) = LengthValidator::new()
            .max(150)
            .validate(&username, "username")
            .await
        {
            errors.merge(failures);
        }

        let password = json!(self.password);
        if let Err(failures) = required.validate(&password, "password").await {
            errors.merge(failures);
        } else if let Err(failures) = LengthValidator::new()
            .min(8)
            .message("password must be at least 8 characters long")
            .validate(&password, "password")
            .await
        {
            errors.merge(failures);
        }

        let license = json!(self.license_number);
        if let Err(failures) = required.validate(&license, "license_number").await {
            errors.merge(failures);
        } else if let Err(failures) = LicenseNumberValidator::new()
            .validate(&license, "license_number")
            .await
        {
            errors.merge(failures);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseUpdatePayload {
    #[serde(default)]
    pub license_number: String,
}

#[async_trait]
impl ValidatePayload for LicenseUpdatePayload {
    async fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        let license = json!(self.license_number);
        if let Err(failures) = RequiredValidator::new()
            .validate(&license, "license_number")
            .await
        {
            errors.merge(failures);
        } else if let Err(failures) = LicenseNumberValidator::new()
            .validate(&license, "license_number")
            .await
        {
            errors.merge(failures);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarPayload {
    #[serde(default)]
    pub model: String,
    pub manufacturer_id: Option<Uuid>,
    #[serde(default)]
    pub drivers: Vec<Uuid>,
}

#[async_trait]
impl ValidatePayload for CarPayload {
    async fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        let required = RequiredValidator::new();

        let model = json!(self.model);
        if let Err(failures) = required.validate(&model, "model").await {
            errors.merge(failures);
        } else if let Err(failures) = LengthValidator::new()
            .max(255)
            .validate(&model, "model")
            .await
        {
            errors.merge(failures);
        }

        if let Err(failures) = required
            .validate(&json!(self.manufacturer_id), "manufacturer_id")
            .await
        {
            errors.merge(failures);
        }

        errors.into_result()
    }
}
