//! HTTP server startup.
//!
//! Provides [`setup_state`], which opens the store and creates the fallback
//! generator, and [`serve`], which runs the axum router until ctrl-c.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::RejoinderConfig;
use crate::generator::{self, ResponseGenerator};
use crate::routes::{self, AppState};
use crate::store::KnowledgeStore;

/// Shared setup: open the store, create the generator, wrap both for sharing.
pub fn setup_state(config: RejoinderConfig) -> Result<AppState> {
    let store_path = config.resolved_store_path();
    let store = KnowledgeStore::open(&store_path);

    let stats = store.statistics();
    tracing::info!(
        store = %store_path.display(),
        connected = store.is_connected(),
        patterns = stats.total_patterns,
        responses = stats.total_responses,
        "knowledge store ready"
    );

    let report = store.load_report();
    if !report.is_clean() {
        tracing::warn!(
            skipped_categories = report.skipped_categories,
            skipped_groups = report.skipped_groups,
            skipped_messages = report.skipped_messages,
            "store contained malformed entries; run `rejoinder doctor` for details"
        );
    }

    let generator: Arc<dyn ResponseGenerator> =
        Arc::from(generator::create_generator(&config.generator)?);
    tracing::info!(provider = generator.name(), "fallback generator ready");

    Ok(AppState::new(store, generator, config))
}

/// Start the HTTP server.
pub async fn serve(config: RejoinderConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting rejoinder HTTP server");

    let state = setup_state(config)?;
    let router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c; running until killed");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
