//! Shared application state

use std::sync::Arc;

use fleet_storage::FleetStore;

use crate::auth::SessionStore;

/// State handed to every handler: the persistence surface and the session
/// table. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
