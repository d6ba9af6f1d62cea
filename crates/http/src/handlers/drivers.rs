//! Driver CRUD and the license update.
//!
//! Creation hashes the password before it reaches the store; the plaintext
//! never leaves this handler. The license format is checked on create and on
//! the dedicated PATCH, never anywhere else.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleet_core::SearchTerm;
use fleet_storage::{ListQuery, NewDriver};
use fleet_validation::ValidatePayload;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{hash_password, CurrentDriver};
use crate::error::{ApiError, ApiResult};
use crate::pagination::{PageParams, PaginationMeta};
use crate::requests::{DriverCreatePayload, LicenseUpdatePayload};
use crate::responses::{DriverDetail, DriverView, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DriverListParams {
    /// Case-insensitive substring match on the username.
    pub driver: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Query(params): Query<DriverListParams>,
) -> ApiResult<Json<ListResponse<DriverView>>> {
    let pages = PageParams {
        page: params.page,
        per_page: params.per_page,
    };
    let query = pages.apply(ListQuery::new(SearchTerm::from(params.driver)));

    let items = state.store.list_drivers(&query).await?;
    let total = state.store.count_drivers(&query.search).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(DriverView::from).collect(),
        meta: PaginationMeta::new(&query, total),
    }))
}

pub async fn show(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DriverDetail>> {
    let driver = state.store.find_driver(id).await?;
    let cars = state.store.cars_for_driver(id).await?;
    Ok(Json(DriverDetail::new(driver, cars)))
}

pub async fn create(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Json(payload): Json<DriverCreatePayload>,
) -> ApiResult<(StatusCode, Json<DriverView>)> {
    payload.validate().await?;

    let password_hash =
        hash_password(&payload.password).map_err(|err| ApiError::internal(err.to_string()))?;
    let driver = state
        .store
        .create_driver(NewDriver {
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            license_number: payload.license_number,
            password_hash,
        })
        .await?;
    tracing::info!(username = %driver.username, "driver created");
    Ok((StatusCode::CREATED, Json(driver.into())))
}

pub async fn update_license(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LicenseUpdatePayload>,
) -> ApiResult<Json<DriverView>> {
    payload.validate().await?;
    let driver = state
        .store
        .update_license(id, payload.license_number)
        .await?;
    Ok(Json(driver.into()))
}

pub async fn destroy(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_driver(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
