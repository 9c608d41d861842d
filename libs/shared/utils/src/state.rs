use std::sync::Arc;

use axum::extract::FromRef;

use shared_config::AppConfig;
use shared_models::session::SessionStore;

/// Router state shared by every cell. Handlers that only need the
/// configuration extract `State<Arc<AppConfig>>` through [`FromRef`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: SessionStore::new(),
        }
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
