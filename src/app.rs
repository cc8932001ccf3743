//! Application state and initialization
//!
//! All services are wired here and made available through AppState.

use crate::api::ApiClient;
use crate::error::Result;
use crate::services::backend::{LocalBackend, NotesBackend, RemoteBackend};
use crate::services::controller::NotesController;
use crate::services::toast::ToastQueue;
use crate::storage::LocalStore;
use crate::view::{ConfirmProvider, Render, ToastSink};
use std::path::PathBuf;
use std::sync::Arc;

/// Which note source backs the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Everything lives in the local store
    Local,
    /// Mutations are confirmed by the remote notes service
    Api,
}

/// Central application state holding all services
pub struct AppState {
    pub data_dir: PathBuf,
    pub store: LocalStore,
    /// Present in API mode only; used for register/login
    pub api: Option<ApiClient>,
    pub controller: NotesController,
}

/// Application setup - called once on startup
pub async fn setup(
    data_dir: PathBuf,
    mode: Mode,
    renderer: Arc<dyn Render>,
    confirm: Arc<dyn ConfirmProvider>,
    toast_sink: Arc<dyn ToastSink>,
) -> Result<AppState> {
    tracing::info!("Initializing application in {:?} mode", mode);
    tracing::info!("Data directory: {:?}", data_dir);

    std::fs::create_dir_all(&data_dir)?;

    let store = LocalStore::new(data_dir.join("storage"));
    store.initialize().await?;

    let (backend, api): (Arc<dyn NotesBackend>, Option<ApiClient>) = match mode {
        Mode::Local => (Arc::new(LocalBackend::new(store.clone())), None),
        Mode::Api => {
            let client = ApiClient::new(store.clone(), None).await?;
            (
                Arc::new(RemoteBackend::new(client.clone())),
                Some(client),
            )
        }
    };

    let toasts = ToastQueue::new(toast_sink);
    let controller = NotesController::new(backend, store.clone(), renderer, confirm, toasts);

    tracing::info!("Application initialized successfully");

    Ok(AppState {
        data_dir,
        store,
        api,
        controller,
    })
}
