//! HTTP error mapping
//!
//! Two recoverable failure kinds reach clients with structure: validation
//! failures (422, per-field messages) and constraint violations (409, a
//! generic "could not save" shape). Everything else collapses to 404, 401 or
//! a bare 500 with the detail kept server-side in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_storage::StoreError;
use fleet_validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }
}

fn error_body(code: &str, message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "error": {
            "code": code,
            "message": message,
        }
    }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors.to_json())).into_response()
            }
            ApiError::Store(err) if err.is_constraint_violation() => {
                tracing::debug!(error = %err, "write rejected by constraint");
                (
                    StatusCode::CONFLICT,
                    error_body("conflict", "could not save: a storage constraint was violated"),
                )
                    .into_response()
            }
            ApiError::Store(StoreError::NotFound { entity }) => (
                StatusCode::NOT_FOUND,
                error_body("not_found", &format!("{entity} not found")),
            )
                .into_response(),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal", "internal server error"),
                )
                    .into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_body("unauthorized", "authentication required"),
            )
                .into_response(),
            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, error_body("bad_request", &message)).into_response()
            }
            ApiError::Internal { message } => {
                tracing::error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal", "internal server error"),
                )
                    .into_response()
            }
        }
    }
}
