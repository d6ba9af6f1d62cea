//! Session-cookie authentication
//!
//! Opaque UUID tokens in an HttpOnly cookie, mapped to sessions in process
//! memory. Passwords are hashed with Argon2id. The acting driver for any
//! authenticated operation comes from the [`CurrentDriver`] extractor and
//! never from a client-supplied id.

use std::collections::HashMap;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use fleet_core::Driver;
use fleet_validation::ValidatePayload;
use rand::thread_rng;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::requests::LoginPayload;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "fleet_session";

/// Hash a password with Argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut thread_rng());
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored Argon2 hash. Malformed hashes count
/// as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
struct Session {
    driver_id: Option<Uuid>,
    visits: u64,
}

/// In-process session table keyed by opaque tokens.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a home-page visit, creating an anonymous session when the
    /// token is absent or stale. Returns the token to use, the visit count
    /// and whether a fresh cookie must be issued.
    pub async fn record_visit(&self, token: Option<Uuid>) -> (Uuid, u64, bool) {
        let mut sessions = self.sessions.write().await;
        if let Some(token) = token {
            if let Some(session) = sessions.get_mut(&token) {
                session.visits += 1;
                return (token, session.visits, false);
            }
        }
        let token = Uuid::new_v4();
        sessions.insert(
            token,
            Session {
                driver_id: None,
                visits: 1,
            },
        );
        (token, 1, true)
    }

    /// Bind a driver to a fresh session token, discarding any previous
    /// session for the old token. The visit counter carries over.
    pub async fn log_in(&self, old_token: Option<Uuid>, driver_id: Uuid) -> Uuid {
        let mut sessions = self.sessions.write().await;
        let visits = old_token
            .and_then(|token| sessions.remove(&token))
            .map(|session| session.visits)
            .unwrap_or(0);
        let token = Uuid::new_v4();
        sessions.insert(
            token,
            Session {
                driver_id: Some(driver_id),
                visits,
            },
        );
        token
    }

    pub async fn log_out(&self, token: Uuid) {
        self.sessions.write().await.remove(&token);
    }

    /// The driver bound to the session, if the session exists and is
    /// authenticated.
    pub async fn driver_id(&self, token: Uuid) -> Option<Uuid> {
        self.sessions.read().await.get(&token)?.driver_id
    }
}

/// Extract the session token from the Cookie header.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value).ok()
        } else {
            None
        }
    })
}

pub(crate) fn session_cookie(token: Uuid) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub(crate) fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

/// The authenticated driver for the current request.
///
/// Rejects with 401 when the cookie is missing, the session is anonymous or
/// stale, or the driver row no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentDriver {
    pub token: Uuid,
    pub driver: Driver,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentDriver {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let driver_id = state
            .sessions
            .driver_id(token)
            .await
            .ok_or(ApiError::Unauthorized)?;
        let driver = state
            .store
            .find_driver(driver_id)
            .await
            .map_err(|_| ApiError::Unauthorized)?;
        Ok(CurrentDriver { token, driver })
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginPayload>,
) -> ApiResult<impl IntoResponse> {
    payload.validate().await?;

    let driver = state
        .store
        .find_driver_by_username(&payload.username)
        .await
        .map_err(|_| ApiError::Unauthorized)?;
    if !verify_password(&payload.password, &driver.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = state.sessions.log_in(session_token(&headers), driver.id).await;
    tracing::info!(username = %driver.username, "driver logged in");
    Ok((
        [(header::SET_COOKIE, session_cookie(token))],
        Json(json!({ "driver": driver })),
    ))
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.sessions.log_out(token).await;
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("complexpassword123").unwrap();
        assert_ne!(hash, "complexpassword123");
        assert!(verify_password("complexpassword123", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("complexpassword123", "not-a-phc-hash"));
    }

    #[test]
    fn session_token_is_parsed_from_cookie_header() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}; lang=en"))
                .unwrap(),
        );
        assert_eq!(session_token(&headers), Some(token));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}=not-a-uuid")).unwrap(),
        );
        assert_eq!(session_token(&headers), None);
    }

    #[tokio::test]
    async fn visits_accumulate_per_session() {
        let store = SessionStore::new();

        let (token, visits, issued) = store.record_visit(None).await;
        assert_eq!(visits, 1);
        assert!(issued);

        let (same, visits, issued) = store.record_visit(Some(token)).await;
        assert_eq!(same, token);
        assert_eq!(visits, 2);
        assert!(!issued);

        // A stale token gets a fresh session.
        let (fresh, visits, issued) = store.record_visit(Some(Uuid::new_v4())).await;
        assert_ne!(fresh, token);
        assert_eq!(visits, 1);
        assert!(issued);
    }

    #[tokio::test]
    async fn login_rotates_the_token_and_logout_drops_it() {
        let store = SessionStore::new();
        let driver_id = Uuid::new_v4();

        let (anon, _, _) = store.record_visit(None).await;
        let token = store.log_in(Some(anon), driver_id).await;
        assert_ne!(token, anon);
        assert_eq!(store.driver_id(token).await, Some(driver_id));
        // The pre-login token is gone.
        assert_eq!(store.driver_id(anon).await, None);

        store.log_out(token).await;
        assert_eq!(store.driver_id(token).await, None);
    }
}
