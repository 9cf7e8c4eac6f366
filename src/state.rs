use std::sync::Arc;

use crate::{config::AppConfig, dao::score_store::ScoreStore};

pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle chosen at startup and the runtime
/// configuration. Both are immutable for the lifetime of the process.
pub struct AppState {
    store: Arc<dyn ScoreStore>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn ScoreStore>, config: AppConfig) -> SharedState {
        Arc::new(Self { store, config })
    }

    /// Storage backend shared by every request.
    pub fn store(&self) -> Arc<dyn ScoreStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
