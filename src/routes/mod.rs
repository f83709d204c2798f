//! HTTP boundary: shared state, router, and handlers.
//!
//! [`AppState`] holds the store behind a mutex so every select / record /
//! persist sequence runs one at a time, plus the fallback generator.

pub mod chat;
pub mod status;

use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RejoinderConfig;
use crate::generator::ResponseGenerator;
use crate::store::KnowledgeStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<KnowledgeStore>>,
    pub generator: Arc<dyn ResponseGenerator>,
    pub config: Arc<RejoinderConfig>,
}

impl AppState {
    pub fn new(
        store: KnowledgeStore,
        generator: Arc<dyn ResponseGenerator>,
        config: RejoinderConfig,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            generator,
            config: Arc::new(config),
        }
    }

    /// Lock the store, mapping a poisoned mutex to an error.
    pub fn lock_store(&self) -> anyhow::Result<MutexGuard<'_, KnowledgeStore>> {
        self.store
            .lock()
            .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))
    }

    pub fn database_connected(&self) -> bool {
        self.lock_store()
            .map(|store| store.is_connected())
            .unwrap_or(false)
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(status::index_handler))
        .route("/favicon.ico", get(status::favicon_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/health", get(status::health_handler))
        .route("/api/stats", get(status::stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
