//! Manufacturer CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleet_core::SearchTerm;
use fleet_storage::{ListQuery, ManufacturerChanges, NewManufacturer};
use fleet_validation::ValidatePayload;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentDriver;
use crate::error::ApiResult;
use crate::pagination::{PageParams, PaginationMeta};
use crate::requests::ManufacturerPayload;
use crate::responses::{ListResponse, ManufacturerView};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ManufacturerListParams {
    /// Case-insensitive substring match on the name.
    pub manufacturer: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Query(params): Query<ManufacturerListParams>,
) -> ApiResult<Json<ListResponse<ManufacturerView>>> {
    let pages = PageParams {
        page: params.page,
        per_page: params.per_page,
    };
    let query = pages.apply(ListQuery::new(SearchTerm::from(params.manufacturer)));

    let items = state.store.list_manufacturers(&query).await?;
    let total = state.store.count_manufacturers(&query.search).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(ManufacturerView::from).collect(),
        meta: PaginationMeta::new(&query, total),
    }))
}

pub async fn show(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ManufacturerView>> {
    let manufacturer = state.store.find_manufacturer(id).await?;
    Ok(Json(manufacturer.into()))
}

pub async fn create(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Json(payload): Json<ManufacturerPayload>,
) -> ApiResult<(StatusCode, Json<ManufacturerView>)> {
    payload.validate().await?;
    let manufacturer = state
        .store
        .create_manufacturer(NewManufacturer {
            name: payload.name,
            country: payload.country,
        })
        .await?;
    tracing::info!(name = %manufacturer.name, "manufacturer created");
    Ok((StatusCode::CREATED, Json(manufacturer.into())))
}

pub async fn update(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ManufacturerPayload>,
) -> ApiResult<Json<ManufacturerView>> {
    payload.validate().await?;
    let manufacturer = state
        .store
        .update_manufacturer(
            id,
            ManufacturerChanges {
                name: payload.name,
                country: payload.country,
            },
        )
        .await?;
    Ok(Json(manufacturer.into()))
}

pub async fn destroy(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_manufacturer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
