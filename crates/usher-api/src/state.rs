//! Application state for the cart API

use std::sync::Arc;

use usher_core::{CartResult, ConfigStore, ObserverRegistry};
use usher_serial::SerialSession;

use crate::error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigStore>,
    session: Arc<SerialSession>,
    observers: Arc<ObserverRegistry>,
}

impl AppState {
    pub fn new(
        config: Arc<ConfigStore>,
        session: Arc<SerialSession>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            config,
            session,
            observers,
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn session(&self) -> &Arc<SerialSession> {
        &self.session
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Run a session operation off the async workers. Sends block on the
    /// session lock, the physical write, and (for an implicit connect) the
    /// device settle delay.
    pub async fn with_session<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&SerialSession) -> CartResult<T> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || op(&session))
            .await
            .map_err(|e| ApiError::Internal(format!("session task failed: {e}")))?
            .map_err(ApiError::from)
    }
}
