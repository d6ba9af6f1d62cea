//! Route table.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::auth;
use crate::handlers::{cars, drivers, home, manufacturers};
use crate::state::AppState;

/// Build the full application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/manufacturers",
            get(manufacturers::list).post(manufacturers::create),
        )
        .route(
            "/manufacturers/:id",
            get(manufacturers::show)
                .put(manufacturers::update)
                .delete(manufacturers::destroy),
        )
        .route("/cars", get(cars::list).post(cars::create))
        .route(
            "/cars/:id",
            get(cars::show).put(cars::update).delete(cars::destroy),
        )
        .route("/cars/:id/assignment", post(cars::toggle_assignment))
        .route("/drivers", get(drivers::list).post(drivers::create))
        .route(
            "/drivers/:id",
            get(drivers::show).delete(drivers::destroy),
        )
        .route("/drivers/:id/license", patch(drivers::update_license))
        .with_state(state)
}
