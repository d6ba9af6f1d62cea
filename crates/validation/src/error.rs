//! Validation error types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// A single validation failure attached to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: "validation_failed".to_string(),
        }
    }

    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation failures grouped per field.
///
/// Field order is kept stable (BTreeMap) so serialized error payloads are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Error)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single validation error.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.entry(error.field.clone()).or_default().push(error);
    }

    /// Add a simple validation error with field and message.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn field_errors(&self, field: &str) -> Option<&Vec<ValidationError>> {
        self.errors.get(field)
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|errors| !errors.is_empty())
    }

    /// Merge another set of failures into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    pub fn from_error(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }

    /// Collapse into a result: `Ok(())` when no failure was recorded.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// JSON shape used by 422 responses.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "fields": self.errors,
            }
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "No validation errors");
        }
        write!(f, "Validation failed for {} field(s):", self.errors.len())?;
        for errors in self.errors.values() {
            for error in errors {
                write!(f, "\n  {}: {}", error.field, error.message)?;
            }
        }
        Ok(())
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_carries_field_message_and_code() {
        let error = ValidationError::new("model", "model is required");
        assert_eq!(error.field, "model");
        assert_eq!(error.message, "model is required");
        assert_eq!(error.code, "validation_failed");

        let coded = ValidationError::with_code("license_number", "bad format", "license_format");
        assert_eq!(coded.code, "license_format");
    }

    #[test]
    fn errors_group_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add_error("username", "username is required");
        errors.add_error("license_number", "too short");
        errors.add_error("username", "already taken");

        assert_eq!(errors.len(), 2);
        assert!(errors.has_field_errors("username"));
        assert!(!errors.has_field_errors("model"));
        assert_eq!(errors.field_errors("username").unwrap().len(), 2);
    }

    #[test]
    fn merge_combines_field_lists() {
        let mut first = ValidationErrors::from_error(ValidationError::new("a", "one"));
        let mut second = ValidationErrors::new();
        second.add_error("b", "two");
        second.add_error("a", "three");

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.field_errors("a").unwrap().len(), 2);
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(ValidationErrors::new().into_result().is_ok());
        assert!(ValidationErrors::from_error(ValidationError::new("f", "m"))
            .into_result()
            .is_err());
    }

    #[test]
    fn json_shape_nests_fields() {
        let errors = ValidationErrors::from_error(ValidationError::new("model", "required"));
        let json = errors.to_json();
        assert_eq!(json["error"]["code"], "validation_failed");
        assert!(json["error"]["fields"]["model"].is_array());
    }
}
