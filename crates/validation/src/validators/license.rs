//! Driver license number validator
//!
//! A license number is exactly 8 characters: 3 uppercase ASCII letters
//! followed by 5 ASCII digits (`ABC12345`). The three checks run in order
//! and only the first failing rule is reported.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::traits::ValidationRule;

pub const LICENSE_NUMBER_LEN: usize = 8;
const LETTER_PREFIX_LEN: usize = 3;

/// Validate a license number, returning it unchanged on success.
pub fn validate_license_number(value: &str) -> Result<&str, ValidationError> {
    if value.chars().count() != LICENSE_NUMBER_LEN {
        return Err(ValidationError::with_code(
            "license_number",
            "License number should consist of 8 characters",
            "license_length",
        ));
    }

    if !value
        .chars()
        .take(LETTER_PREFIX_LEN)
        .all(|c| c.is_ascii_uppercase())
    {
        return Err(ValidationError::with_code(
            "license_number",
            "First 3 characters should be uppercase letters",
            "license_prefix",
        ));
    }

    if !value
        .chars()
        .skip(LETTER_PREFIX_LEN)
        .all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::with_code(
            "license_number",
            "Last 5 characters should be digits",
            "license_digits",
        ));
    }

    Ok(value)
}

/// [`ValidationRule`] wrapper around [`validate_license_number`] so the
/// format check composes with the other field validators.
#[derive(Debug, Clone, Default)]
pub struct LicenseNumberValidator;

impl LicenseNumberValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ValidationRule for LicenseNumberValidator {
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()> {
        // Null checks belong to RequiredValidator
        if value.is_null() {
            return Ok(());
        }

        let text = match value.as_str() {
            Some(text) => text,
            None => {
                return Err(ValidationError::with_code(
                    field,
                    format!("{} must be a string", field),
                    "invalid_type",
                )
                .into());
            }
        };

        validate_license_number(text)
            .map(|_| ())
            .map_err(|error| ValidationError::with_code(field, error.message, error.code).into())
    }

    fn rule_name(&self) -> &'static str {
        "license_number"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_license_number_is_returned_unchanged() {
        assert_eq!(validate_license_number("ABC12345").unwrap(), "ABC12345");
    }

    #[test]
    fn wrong_length_reports_the_length_message() {
        for value in ["", "AB1234", "ABC1234", "ABC123456", "ABCD123456789"] {
            let error = validate_license_number(value).unwrap_err();
            assert_eq!(
                error.message, "License number should consist of 8 characters",
                "value: {value:?}"
            );
            assert_eq!(error.code, "license_length");
        }
    }

    #[test]
    fn bad_prefix_reports_the_letters_message() {
        for value in ["A1C12345", "abc12345", "1234ABCD", "AbC12345", "ABÇ12345"] {
            let error = validate_license_number(value).unwrap_err();
            assert_eq!(
                error.message, "First 3 characters should be uppercase letters",
                "value: {value:?}"
            );
            assert_eq!(error.code, "license_prefix");
        }
    }

    #[test]
    fn bad_suffix_reports_the_digits_message() {
        for value in ["ABC1234A", "ABCDEFGH", "XYZ12 45"] {
            let error = validate_license_number(value).unwrap_err();
            assert_eq!(
                error.message, "Last 5 characters should be digits",
                "value: {value:?}"
            );
            assert_eq!(error.code, "license_digits");
        }
    }

    #[test]
    fn checks_short_circuit_in_order() {
        // Bad prefix and bad suffix at once: only the prefix message surfaces.
        let error = validate_license_number("a1czzzzz").unwrap_err();
        assert_eq!(error.code, "license_prefix");

        // Wrong length beats everything else.
        let error = validate_license_number("a1czzzz").unwrap_err();
        assert_eq!(error.code, "license_length");
    }

    #[tokio::test]
    async fn rule_wrapper_reports_against_the_given_field() {
        let rule = LicenseNumberValidator::new();

        assert!(rule
            .validate(&Value::String("ABC12345".into()), "license_number")
            .await
            .is_ok());

        let err = rule
            .validate(&Value::String("1234".into()), "license_number")
            .await
            .unwrap_err();
        let field_errors = err.field_errors("license_number").unwrap();
        assert_eq!(
            field_errors[0].message,
            "License number should consist of 8 characters"
        );

        assert!(rule.validate(&Value::Null, "license_number").await.is_ok());
        assert!(rule
            .validate(&Value::Number(8.into()), "license_number")
            .await
            .is_err());
    }
}
