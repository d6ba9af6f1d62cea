//! Storage error types
//!
//! Constraint violations (uniqueness, required references) are separate
//! variants so callers can tell a rejected write from an infrastructure
//! failure. PostgreSQL reports them as SQLSTATE 23505/23503; the in-memory
//! backend raises the same variants from its own checks.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the storage layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        StoreError::NotFound { entity }
    }

    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    pub fn foreign_key_violation(constraint: impl Into<String>) -> Self {
        StoreError::ForeignKeyViolation {
            constraint: constraint.into(),
        }
    }

    /// True for write failures caused by an entity invariant.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. } | StoreError::ForeignKeyViolation { .. }
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            match db.code().as_deref() {
                Some("23505") => return StoreError::UniqueViolation { constraint },
                Some("23503") => return StoreError::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::not_found("record");
        }
        StoreError::Database(err.to_string())
    }
}
