use crate::auth::session::SessionManager;
use crate::config::AppConfig;
use crate::store::EntityStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: EntityStore,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions = SessionManager::new(config.session.clone());
        Self {
            config,
            store: EntityStore::new(),
            sessions,
        }
    }
}
