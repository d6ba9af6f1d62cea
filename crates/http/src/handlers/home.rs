//! GET / — entity totals and the per-session visit counter.
//!
//! The one endpoint that tolerates anonymous callers: a first visit creates
//! an anonymous session and sets the cookie, and repeat visits under the
//! same cookie increment the counter.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_core::SearchTerm;

use crate::auth::{session_cookie, session_token};
use crate::error::{ApiError, ApiResult};
use crate::responses::HomeSummary;
use crate::state::AppState;

pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let (token, visits, issued) = state.sessions.record_visit(session_token(&headers)).await;

    let all = SearchTerm::default();
    let summary = HomeSummary {
        num_manufacturers: state.store.count_manufacturers(&all).await?,
        num_cars: state.store.count_cars(&all).await?,
        num_drivers: state.store.count_drivers(&all).await?,
        num_visits: visits,
    };

    let mut response = Json(summary).into_response();
    if issued {
        let cookie = HeaderValue::from_str(&session_cookie(token))
            .map_err(|err| ApiError::internal(err.to_string()))?;
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}
