//! # fleet-http
//!
//! HTTP surface for the fleet management service: a JSON API over the store
//! traits with session-cookie authentication. Handlers receive their inputs
//! explicitly (query parameters, path parameters, the authenticated driver)
//! and return explicit view models; there is no ambient request state.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
