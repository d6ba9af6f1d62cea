//! Core validation traits

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ValidationResult;

/// A reusable validation rule over a single field value.
#[async_trait]
pub trait ValidationRule: Send + Sync {
    /// Validate a single value, reporting failures against `field`.
    async fn validate(&self, value: &Value, field: &str) -> ValidationResult<()>;

    /// Name of the rule, used in logs and diagnostics.
    fn rule_name(&self) -> &'static str;
}

/// A request payload that can validate itself before being handed to a
/// store. Implementations collect every field failure instead of stopping at
/// the first one.
#[async_trait]
pub trait ValidatePayload: Send + Sync {
    async fn validate(&self) -> ValidationResult<()>;
}
