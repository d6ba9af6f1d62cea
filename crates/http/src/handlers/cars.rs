//! Car CRUD and the assignment toggle.
//!
//! The toggle acts on the authenticated driver only: POSTing to a car's
//! assignment flips whether that car sits in the caller's assigned set.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleet_core::{Car, SearchTerm};
use fleet_storage::{CarChanges, ListQuery, NewCar};
use fleet_validation::ValidatePayload;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentDriver;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{PageParams, PaginationMeta};
use crate::requests::CarPayload;
use crate::responses::{AssignmentView, CarDetail, CarView, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CarListParams {
    /// Case-insensitive substring match on the model.
    pub car: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Query(params): Query<CarListParams>,
) -> ApiResult<Json<ListResponse<CarView>>> {
    let pages = PageParams {
        page: params.page,
        per_page: params.per_page,
    };
    let query = pages.apply(ListQuery::new(SearchTerm::from(params.car)));

    let items = state.store.list_cars(&query).await?;
    let total = state.store.count_cars(&query.search).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(CarView::from).collect(),
        meta: PaginationMeta::new(&query, total),
    }))
}

async fn detail(state: &AppState, car: Car) -> ApiResult<CarDetail> {
    let manufacturer = state.store.find_manufacturer(car.manufacturer_id).await?;
    let drivers = state.store.drivers_for_car(car.id).await?;
    Ok(CarDetail::new(car, manufacturer, drivers))
}

pub async fn show(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CarDetail>> {
    let car = state.store.find_car(id).await?;
    Ok(Json(detail(&state, car).await?))
}

pub async fn create(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Json(payload): Json<CarPayload>,
) -> ApiResult<(StatusCode, Json<CarDetail>)> {
    payload.validate().await?;
    let manufacturer_id = payload
        .manufacturer_id
        .ok_or_else(|| ApiError::bad_request("manufacturer_id is required"))?;

    let car = state
        .store
        .create_car(NewCar {
            model: payload.model,
            manufacturer_id,
            drivers: payload.drivers,
        })
        .await?;
    tracing::info!(model = %car.model, "car created");
    Ok((StatusCode::CREATED, Json(detail(&state, car).await?)))
}

pub async fn update(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CarPayload>,
) -> ApiResult<Json<CarDetail>> {
    payload.validate().await?;
    let manufacturer_id = payload
        .manufacturer_id
        .ok_or_else(|| ApiError::bad_request("manufacturer_id is required"))?;

    let car = state
        .store
        .update_car(
            id,
            CarChanges {
                model: payload.model,
                manufacturer_id,
                drivers: payload.drivers,
            },
        )
        .await?;
    Ok(Json(detail(&state, car).await?))
}

pub async fn destroy(
    _auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete_car(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cars/:id/assignment — flip the caller's membership in the car's
/// driver set.
pub async fn toggle_assignment(
    auth: CurrentDriver,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AssignmentView>> {
    let outcome = state.store.toggle_assignment(auth.driver.id, id).await?;
    tracing::info!(
        username = %auth.driver.username,
        car_id = %id,
        outcome = ?outcome,
        "assignment toggled"
    );
    Ok(Json(AssignmentView::new(outcome, id, auth.driver.id)))
}
