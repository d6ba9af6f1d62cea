//! # fleet-validation
//!
//! Typed field validation for the fleet management service. A validation
//! outcome is either the validated value or a structured failure carrying a
//! field name, a human-readable message and a machine-readable code; request
//! payloads collect failures per field into [`ValidationErrors`].

pub mod error;
pub mod traits;
pub mod validators;

pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use traits::{ValidatePayload, ValidationRule};
pub use validators::{
    length::LengthValidator,
    license::{validate_license_number, LicenseNumberValidator},
    required::RequiredValidator,
};
